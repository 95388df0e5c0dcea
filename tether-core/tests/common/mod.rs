//! Recording transport doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tether_core::sync::{Connection, ConnectionId, Connector, RetryScheduler};
use tether_core::TransportError;

/// Everything the client did to the outside world.
#[derive(Default)]
pub struct Recorder {
    pub sent: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<(String, ConnectionId)>>,
    pub retries: Mutex<Vec<(Duration, ConnectionId)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn Connector> {
        Arc::new(RecordingConnector(Arc::clone(self)))
    }

    pub fn scheduler(self: &Arc<Self>) -> Arc<dyn RetryScheduler> {
        Arc::new(RecordingScheduler(Arc::clone(self)))
    }

    pub fn last_retry(&self) -> Option<ConnectionId> {
        self.retries.lock().last().map(|(_, id)| *id)
    }
}

struct RecordingConnection(Arc<Recorder>);

impl Connection for RecordingConnection {
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.0.sent.lock().push(text.to_owned());
        Ok(())
    }
}

struct RecordingConnector(Arc<Recorder>);

impl Connector for RecordingConnector {
    fn open(&self, endpoint: &str, id: ConnectionId) -> Result<Arc<dyn Connection>, TransportError> {
        self.0.opened.lock().push((endpoint.to_owned(), id));
        Ok(Arc::new(RecordingConnection(Arc::clone(&self.0))))
    }
}

struct RecordingScheduler(Arc<Recorder>);

impl RetryScheduler for RecordingScheduler {
    fn schedule(&self, delay: Duration, id: ConnectionId) {
        self.0.retries.lock().push((delay, id));
    }
}
