//! Tokio driver.
//!
//! Runs a [`SyncClient`] over real WebSockets. Socket tasks and retry timers
//! never touch the client directly: they post [`DriverEvent`]s to one queue,
//! and a single task feeds them to the client in arrival order. That keeps
//! the client's single-threaded, event-at-a-time model intact on a
//! multi-threaded runtime.
//!
//! Also hosts the [`PlaybackClock`], which advances `time-pos` locally
//! between server updates while the player is running.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use super::{ClientConfig, Connection, ConnectionId, Connector, RetryScheduler, SyncClient, TransportEvent};
use crate::error::{StoreError, TransportError};
use crate::reactive::{Effect, ReactiveStore};

/// State key: `true` while the player is paused.
pub const PAUSE_KEY: &str = "pause";
/// State key: `true` while the player has nothing to play.
pub const CORE_IDLE_KEY: &str = "core-idle";
/// State key: playback position in seconds.
pub const TIME_POS_KEY: &str = "time-pos";
/// How often the playback clock advances `time-pos`, and by how much.
pub const PLAYBACK_TICK: Duration = Duration::from_millis(100);

/// Work for the driver loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Transport(ConnectionId, TransportEvent),
    RetryElapsed(ConnectionId),
}

type EventSender = mpsc::UnboundedSender<DriverEvent>;

/// Opens `tokio-tungstenite` connections, one task per socket.
pub struct WsConnector {
    events: EventSender,
}

impl WsConnector {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }
}

impl Connector for WsConnector {
    fn open(&self, endpoint: &str, id: ConnectionId) -> Result<Arc<dyn Connection>, TransportError> {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(
            endpoint.to_owned(),
            id,
            outbound_rx,
            self.events.clone(),
        ));
        Ok(Arc::new(WsConnection { outbound: outbound_tx }))
    }
}

/// Outbound half of a socket task. Dropping it closes the socket.
struct WsConnection {
    outbound: mpsc::UnboundedSender<String>,
}

impl Connection for WsConnection {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.outbound
            .send(text.to_owned())
            .map_err(|_| TransportError::Closed)
    }
}

async fn run_socket(
    endpoint: String,
    id: ConnectionId,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: EventSender,
) {
    let emit = |event| {
        let _ = events.send(DriverEvent::Transport(id, event));
    };

    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(connection = %id, %endpoint, error = %err, "connect failed");
            emit(TransportEvent::Closed);
            return;
        }
    };
    emit(TransportEvent::Open);

    let (mut ws_tx, mut ws_rx) = stream.split();
    loop {
        tokio::select! {
            text = outbound.recv() => match text {
                Some(text) => {
                    if let Err(err) = ws_tx.send(Message::Text(text.into())).await {
                        warn!(connection = %id, error = %err, "socket write failed");
                        break;
                    }
                }
                None => {
                    debug!(connection = %id, "connection dropped; closing socket");
                    let _ = ws_tx.close().await;
                    break;
                }
            },
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => emit(TransportEvent::Message(text.to_string())),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(connection = %id, error = %err, "socket read failed");
                    break;
                }
            },
        }
    }
    emit(TransportEvent::Closed);
}

/// Retry timers backed by `tokio::time::sleep`.
pub struct TokioScheduler {
    events: EventSender,
}

impl TokioScheduler {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }
}

impl RetryScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, id: ConnectionId) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(DriverEvent::RetryElapsed(id));
        });
    }
}

/// Feed queued events to `client` until every sender is gone.
pub async fn run(client: Arc<SyncClient>, mut events: mpsc::UnboundedReceiver<DriverEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            DriverEvent::Transport(id, event) => client.handle_event(id, event),
            DriverEvent::RetryElapsed(id) => client.retry_elapsed(id),
        }
    }
}

/// Build a WebSocket-backed client, connect it, and spawn its driver loop.
///
/// Must be called from within a tokio runtime.
pub fn spawn(
    config: ClientConfig,
    ui: ReactiveStore,
    state: ReactiveStore,
) -> (Arc<SyncClient>, JoinHandle<()>) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let client = Arc::new(SyncClient::new(
        config,
        ui,
        state,
        Arc::new(WsConnector::new(events_tx.clone())),
        Arc::new(TokioScheduler::new(events_tx)),
    ));
    client.connect();
    let handle = tokio::spawn(run(Arc::clone(&client), events_rx));
    (client, handle)
}

/// Advances `time-pos` by [`PLAYBACK_TICK`] every tick while both `pause`
/// and `core-idle` are `false`.
///
/// Dropping the clock stops the ticker and silences its effect.
pub struct PlaybackClock {
    effect: Effect,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PlaybackClock {
    pub fn is_running(&self) -> bool {
        self.ticker.lock().is_some()
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.effect.dispose();
        if let Some(task) = self.ticker.lock().take() {
            task.abort();
        }
    }
}

/// Start the playback clock over `state`.
///
/// `pause` and `core-idle` must already be defined. Must be called from
/// within a tokio runtime.
pub fn spawn_playback_clock(state: &ReactiveStore) -> Result<PlaybackClock, StoreError> {
    let runtime = Handle::current();
    let ticker: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::new(Mutex::new(None));

    let effect = {
        let state = state.clone();
        let ticker = Arc::clone(&ticker);
        Effect::try_new(move |cx| {
            // Read both keys every run so both subscribe on the first one.
            let pause = state.observe(PAUSE_KEY, cx)?;
            let core_idle = state.observe(CORE_IDLE_KEY, cx)?;
            let playing = pause == Value::Bool(false) && core_idle == Value::Bool(false);

            let mut slot = ticker.lock();
            match (playing, slot.is_some()) {
                (true, false) => {
                    debug!("playback clock started");
                    *slot = Some(runtime.spawn(advance_time_pos(state.clone())));
                }
                (false, true) => {
                    debug!("playback clock stopped");
                    if let Some(task) = slot.take() {
                        task.abort();
                    }
                }
                _ => {}
            }
            Ok::<(), StoreError>(())
        })?
    };

    Ok(PlaybackClock { effect, ticker })
}

async fn advance_time_pos(state: ReactiveStore) {
    let step = PLAYBACK_TICK.as_secs_f64();
    let mut ticks = interval_at(Instant::now() + PLAYBACK_TICK, PLAYBACK_TICK);
    loop {
        ticks.tick().await;
        let advanced = state.update(TIME_POS_KEY, |pos| {
            Value::from(pos.as_f64().unwrap_or(0.0) + step)
        });
        if let Err(err) = advanced {
            warn!(error = %err, "playback clock stopped");
            return;
        }
    }
}
