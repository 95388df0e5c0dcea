//! Transport seams.
//!
//! The sync client drives a connection through these traits and receives
//! [`TransportEvent`]s back through [`SyncClient::handle_event`]. The tokio
//! driver implements them over a real socket; tests implement them with
//! recorders.
//!
//! [`SyncClient::handle_event`]: super::SyncClient::handle_event

use std::sync::Arc;
use std::time::Duration;

use super::ConnectionId;
use crate::error::TransportError;

/// Something that happened on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Closed,
}

/// An open (or opening) connection.
pub trait Connection: Send + Sync {
    /// Transmit one text frame.
    fn send_text(&self, text: &str) -> Result<(), TransportError>;
}

/// Opens connections. Events for the new connection must be reported with
/// the given `id`, and must not be delivered from inside `open` itself.
pub trait Connector: Send + Sync {
    fn open(&self, endpoint: &str, id: ConnectionId) -> Result<Arc<dyn Connection>, TransportError>;
}

/// Schedules retry timers. When the delay elapses the embedder calls
/// [`SyncClient::retry_elapsed`](super::SyncClient::retry_elapsed) with `id`.
pub trait RetryScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, id: ConnectionId);
}
