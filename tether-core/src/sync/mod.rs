//! State synchronization with the remote process.
//!
//! The [`SyncClient`] owns the socket lifecycle and translates inbound
//! envelopes into state-store writes. Transport and timers sit behind the
//! traits in [`transport`], so the client itself is plain synchronous code;
//! [`driver`] supplies the tokio/WebSocket implementation.

mod client;
mod config;
pub mod driver;
mod envelope;
mod state;
pub mod transport;

pub use client::SyncClient;
pub use config::ClientConfig;
pub use envelope::{Envelope, Inbound, STATUS_EVENT};
pub use state::{CloseOutcome, ConnectionId, ConnectionState, LinkStatus, Phase};
pub use transport::{Connection, Connector, RetryScheduler, TransportEvent};
