//! Error types shared across the runtime.
//!
//! Each layer owns one error enum. Store and evaluation errors surface to
//! callers; transport and protocol errors are logged by the sync client and
//! never reach the UI beyond the connection indicator.

use thiserror::Error;

/// Errors raised by [`ReactiveStore`](crate::reactive::ReactiveStore) reads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The key was read before it was ever written.
    #[error("undefined store key `{0}`")]
    UndefinedKey(String),
}

/// Errors raised while evaluating a binding expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Message(String),
}

impl EvalError {
    /// Build a free-form evaluation error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Errors recorded by the binding compiler for a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("attribute `{attribute}` references unknown expression `{name}`")]
    UnknownExpression { attribute: String, name: String },

    #[error("attribute `{attribute}` references unknown event handler `{name}`")]
    UnknownHandler { attribute: String, name: String },

    #[error("binding `{attribute}` failed on first evaluation: {source}")]
    Eval {
        attribute: String,
        #[source]
        source: EvalError,
    },
}

/// Errors from the socket transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no open connection")]
    NotConnected,

    #[error("connection closed")]
    Closed,

    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from decoding inbound protocol envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("`status` envelope carries non-object data")]
    StatusNotObject,
}

/// Errors from loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
