//! Sync Client
//!
//! Keeps one socket connection to the remote process, retries a bounded
//! number of times when it drops, and mirrors inbound envelopes into the
//! state store. The connection indicator lives in the UI store under
//! [`ClientConfig::connection_key`].
//!
//! All methods expect to be called sequentially from one event loop. Locks
//! are never held while stores are written, because store writes run
//! bindings, and bindings may call [`SyncClient::send`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::envelope::{Envelope, Inbound};
use super::state::{CloseOutcome, ConnectionId, ConnectionState, LinkStatus, Phase};
use super::transport::{Connection, Connector, RetryScheduler, TransportEvent};
use super::ClientConfig;
use crate::error::TransportError;
use crate::reactive::ReactiveStore;

struct Inner {
    machine: ConnectionState,
    connection: Option<Arc<dyn Connection>>,
}

/// The state-synchronization client.
pub struct SyncClient {
    config: ClientConfig,
    ui: ReactiveStore,
    state: ReactiveStore,
    connector: Arc<dyn Connector>,
    scheduler: Arc<dyn RetryScheduler>,
    inner: Mutex<Inner>,
}

impl SyncClient {
    /// Create an idle client. The connection indicator is initialised to
    /// `-1` unless the UI store already holds it.
    pub fn new(
        config: ClientConfig,
        ui: ReactiveStore,
        state: ReactiveStore,
        connector: Arc<dyn Connector>,
        scheduler: Arc<dyn RetryScheduler>,
    ) -> Self {
        if !ui.contains(&config.connection_key) {
            ui.set(config.connection_key.clone(), LinkStatus::Exhausted.into());
        }
        let machine = ConnectionState::new(config.max_attempts);
        Self {
            config,
            ui,
            state,
            connector,
            scheduler,
            inner: Mutex::new(Inner {
                machine,
                connection: None,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().machine.phase()
    }

    pub fn attempts(&self) -> u32 {
        self.inner.lock().machine.attempts()
    }

    /// The ID of the most recent connection attempt.
    pub fn current_connection(&self) -> ConnectionId {
        self.inner.lock().machine.current()
    }

    pub fn link_status(&self) -> LinkStatus {
        self.inner.lock().machine.link_status()
    }

    /// Open a new connection to the configured endpoint.
    ///
    /// Any previous connection is dropped and its events are ignored from
    /// here on.
    pub fn connect(&self) {
        let id = {
            let mut inner = self.inner.lock();
            inner.connection = None;
            inner.machine.begin_connect()
        };
        let endpoint = self.config.endpoint();
        debug!(connection = %id, %endpoint, "connecting");

        match self.connector.open(&endpoint, id) {
            Ok(connection) => {
                let mut inner = self.inner.lock();
                if inner.machine.current() == id {
                    inner.connection = Some(connection);
                }
            }
            Err(err) => {
                warn!(connection = %id, error = %err, "failed to open connection");
                self.handle_event(id, TransportEvent::Closed);
            }
        }
    }

    /// Forget past failures and connect again. Valid from any phase.
    pub fn reconnect(&self) {
        info!("reconnect requested");
        self.inner.lock().machine.reset_attempts();
        self.connect();
    }

    /// Serialize and transmit `envelope`. Failures are logged, never
    /// returned. Nothing is queued: until the connection is open the
    /// envelope is dropped as `NotConnected`.
    pub fn send(&self, envelope: &Envelope) {
        if let Err(err) = self.try_send(envelope) {
            error!(event = %envelope.event, error = %err, "failed to send envelope");
        }
    }

    fn try_send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let text = envelope.to_json()?;
        // A connection still handshaking does not accept frames.
        let connection = {
            let inner = self.inner.lock();
            match (&inner.connection, inner.machine.phase()) {
                (Some(connection), Phase::Connected) => Arc::clone(connection),
                _ => return Err(TransportError::NotConnected),
            }
        };
        debug!(payload = %text, "sending");
        connection.send_text(&text)
    }

    /// Feed a transport event for connection `id`.
    pub fn handle_event(&self, id: ConnectionId, event: TransportEvent) {
        match event {
            TransportEvent::Open => self.on_open(id),
            TransportEvent::Message(payload) => self.on_message(id, &payload),
            TransportEvent::Closed => self.on_close(id),
        }
    }

    /// Called when the retry timer for `id` fires.
    pub fn retry_elapsed(&self, id: ConnectionId) {
        let due = self.inner.lock().machine.retry_due(id);
        if due {
            self.connect();
        } else {
            debug!(connection = %id, "ignoring superseded retry timer");
        }
    }

    fn on_open(&self, id: ConnectionId) {
        if !self.inner.lock().machine.on_open(id) {
            debug!(connection = %id, "ignoring open from superseded connection");
            return;
        }
        info!(connection = %id, "connected");
        self.set_link_status(LinkStatus::Connected);
        self.send(&Envelope::event(self.config.status_request.clone()));
    }

    fn on_close(&self, id: ConnectionId) {
        let outcome = {
            let mut inner = self.inner.lock();
            let outcome = inner.machine.on_close(id);
            if outcome.is_some() {
                inner.connection = None;
            }
            outcome
        };

        match outcome {
            Some(CloseOutcome::Retry { attempt }) => {
                info!(connection = %id, attempt, max = self.config.max_attempts, "connection closed; retrying");
                self.set_link_status(LinkStatus::Connecting);
                self.scheduler.schedule(self.config.retry_delay(), id);
            }
            Some(CloseOutcome::GiveUp) => {
                warn!(connection = %id, "connection closed; giving up");
                self.set_link_status(LinkStatus::Exhausted);
            }
            None => debug!(connection = %id, "ignoring close from superseded connection"),
        }
    }

    fn on_message(&self, id: ConnectionId, payload: &str) {
        if self.inner.lock().machine.current() != id {
            debug!(connection = %id, "ignoring message from superseded connection");
            return;
        }
        debug!(%payload, "received");
        match Inbound::parse(payload) {
            Ok(Inbound::Status(entries)) => self.state.merge(&entries),
            Ok(Inbound::Update { key, value }) => self.state.set(key, value),
            Err(err) => warn!(error = %err, %payload, "dropping inbound envelope"),
        }
    }

    fn set_link_status(&self, status: LinkStatus) {
        self.ui.set(self.config.connection_key.clone(), status.into());
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SyncClient")
            .field("endpoint", &self.config.endpoint())
            .field("phase", &inner.machine.phase())
            .field("attempts", &inner.machine.attempts())
            .field("connected", &inner.connection.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Default)]
    struct Wire {
        sent: Mutex<Vec<String>>,
        opened: Mutex<Vec<ConnectionId>>,
        retries: Mutex<Vec<(Duration, ConnectionId)>>,
        refuse: Mutex<bool>,
    }

    struct WireConnection(Arc<Wire>);

    impl Connection for WireConnection {
        fn send_text(&self, text: &str) -> Result<(), TransportError> {
            self.0.sent.lock().push(text.to_owned());
            Ok(())
        }
    }

    struct WireConnector(Arc<Wire>);

    impl Connector for WireConnector {
        fn open(&self, endpoint: &str, id: ConnectionId) -> Result<Arc<dyn Connection>, TransportError> {
            if *self.0.refuse.lock() {
                return Err(TransportError::Connect {
                    endpoint: endpoint.to_owned(),
                    reason: "refused".into(),
                });
            }
            self.0.opened.lock().push(id);
            Ok(Arc::new(WireConnection(Arc::clone(&self.0))))
        }
    }

    struct WireScheduler(Arc<Wire>);

    impl RetryScheduler for WireScheduler {
        fn schedule(&self, delay: Duration, id: ConnectionId) {
            self.0.retries.lock().push((delay, id));
        }
    }

    fn client() -> (SyncClient, Arc<Wire>) {
        let wire = Arc::new(Wire::default());
        let client = SyncClient::new(
            ClientConfig::default(),
            ReactiveStore::new(),
            ReactiveStore::with_initial([("volume", json!(0))]),
            Arc::new(WireConnector(Arc::clone(&wire))),
            Arc::new(WireScheduler(Arc::clone(&wire))),
        );
        (client, wire)
    }

    fn link(client: &SyncClient) -> serde_json::Value {
        client.ui.get("sock-conn").unwrap()
    }

    #[test]
    fn starts_disconnected() {
        let (client, _) = client();
        assert_eq!(link(&client), json!(-1));
        assert_eq!(client.phase(), Phase::Idle);
    }

    #[test]
    fn open_requests_status() {
        let (client, wire) = client();
        client.connect();
        let id = client.current_connection();
        client.handle_event(id, TransportEvent::Open);

        assert_eq!(link(&client), json!(1));
        assert_eq!(*wire.sent.lock(), vec![r#"{"event":"get-status"}"#]);
    }

    #[test]
    fn send_without_connection_is_swallowed() {
        let (client, wire) = client();
        client.send(&Envelope::command("pause", json!(true)));
        assert!(wire.sent.lock().is_empty());
    }

    #[test]
    fn send_before_open_is_rejected() {
        let (client, wire) = client();
        client.connect();
        client.send(&Envelope::command("pause", json!(true)));
        assert!(wire.sent.lock().is_empty());

        client.handle_event(client.current_connection(), TransportEvent::Open);
        client.send(&Envelope::command("pause", json!(true)));
        assert_eq!(
            *wire.sent.lock(),
            vec![
                r#"{"event":"get-status"}"#,
                r#"{"event":"pause","data":true}"#
            ]
        );
    }

    #[test]
    fn close_schedules_retry_with_delay() {
        let (client, wire) = client();
        client.connect();
        let id = client.current_connection();
        client.handle_event(id, TransportEvent::Closed);

        assert_eq!(link(&client), json!(0));
        assert_eq!(client.attempts(), 1);
        assert_eq!(*wire.retries.lock(), vec![(Duration::from_secs(1), id)]);

        client.retry_elapsed(id);
        assert_eq!(wire.opened.lock().len(), 2);
        assert_eq!(client.phase(), Phase::Connecting);
    }

    #[test]
    fn refused_open_counts_as_close() {
        let (client, wire) = client();
        *wire.refuse.lock() = true;
        client.connect();

        assert_eq!(client.phase(), Phase::RetryWait);
        assert_eq!(wire.retries.lock().len(), 1);
    }

    #[test]
    fn inbound_updates_state() {
        let (client, _) = client();
        client.connect();
        let id = client.current_connection();
        client.handle_event(id, TransportEvent::Open);

        client.handle_event(id, TransportEvent::Message(r#"{"event":"volume","data":7}"#.into()));
        assert_eq!(client.state.get("volume"), Ok(json!(7)));

        client.handle_event(
            id,
            TransportEvent::Message(r#"{"event":"status","data":{"volume":9,"pause":false}}"#.into()),
        );
        assert_eq!(client.state.get("volume"), Ok(json!(9)));
        assert_eq!(client.state.get("pause"), Ok(json!(false)));

        client.handle_event(id, TransportEvent::Message("{oops".into()));
        assert_eq!(client.state.len(), 2);
    }

    #[test]
    fn stale_messages_are_ignored() {
        let (client, _) = client();
        client.connect();
        let old = client.current_connection();
        client.reconnect();

        client.handle_event(old, TransportEvent::Message(r#"{"event":"volume","data":3}"#.into()));
        assert_eq!(client.state.get("volume"), Ok(json!(0)));
    }
}
