//! Connection state machine.
//!
//! ```text
//! Idle ──connect──▶ Connecting ──open──▶ Connected
//!                     │    ▲                 │
//!                close│    │retry due        │close
//!                     ▼    │                 │
//!                   RetryWait ◀──────────────┘   (attempts < max)
//!                     │
//!                     ▼ close with attempts == max
//!                   Exhausted ──reconnect──▶ Connecting
//! ```
//!
//! Every `connect` starts a new connection ID. Transport events and retry
//! timers carry the ID they were issued for, and anything carrying an old ID
//! is ignored. This is how `reconnect` supersedes a pending retry.

use std::fmt;

use serde_json::Value;

/// Identifies one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting,
    Connected,
    RetryWait,
    Exhausted,
}

/// The tri-state indicator exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// `-1`: disconnected, no more automatic retries.
    Exhausted,
    /// `0`: connecting or waiting to retry.
    Connecting,
    /// `1`: connected.
    Connected,
}

impl LinkStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::Exhausted => -1,
            Self::Connecting => 0,
            Self::Connected => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Self::Exhausted),
            0 => Some(Self::Connecting),
            1 => Some(Self::Connected),
            _ => None,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(Self::from_code)
    }
}

impl From<LinkStatus> for Value {
    fn from(status: LinkStatus) -> Self {
        Value::from(status.code())
    }
}

/// What to do after a transport close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Schedule retry number `attempt` (1-based).
    Retry { attempt: u32 },
    /// Out of attempts.
    GiveUp,
}

/// Phase, attempt counter and current connection ID.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    phase: Phase,
    attempts: u32,
    max_attempts: u32,
    current: ConnectionId,
}

impl ConnectionState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            phase: Phase::Idle,
            attempts: 0,
            max_attempts,
            current: ConnectionId(0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn current(&self) -> ConnectionId {
        self.current
    }

    /// Enter `Connecting` with a fresh connection ID.
    pub fn begin_connect(&mut self) -> ConnectionId {
        self.current = ConnectionId(self.current.0 + 1);
        self.phase = Phase::Connecting;
        self.current
    }

    /// Forget past failures. Used by an explicit reconnect.
    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
    }

    /// Returns `false` if `id` is stale or not connecting.
    ///
    /// Opening does not touch the attempt counter; only
    /// [`reset_attempts`](Self::reset_attempts) does.
    pub fn on_open(&mut self, id: ConnectionId) -> bool {
        if id != self.current || self.phase != Phase::Connecting {
            return false;
        }
        self.phase = Phase::Connected;
        true
    }

    /// Returns `None` if `id` is stale or already closed.
    pub fn on_close(&mut self, id: ConnectionId) -> Option<CloseOutcome> {
        if id != self.current || !matches!(self.phase, Phase::Connecting | Phase::Connected) {
            return None;
        }
        if self.attempts < self.max_attempts {
            self.attempts += 1;
            self.phase = Phase::RetryWait;
            Some(CloseOutcome::Retry {
                attempt: self.attempts,
            })
        } else {
            self.phase = Phase::Exhausted;
            Some(CloseOutcome::GiveUp)
        }
    }

    /// Whether a retry timer issued for `id` should reconnect now.
    pub fn retry_due(&self, id: ConnectionId) -> bool {
        id == self.current && self.phase == Phase::RetryWait
    }

    pub fn link_status(&self) -> LinkStatus {
        match self.phase {
            Phase::Connected => LinkStatus::Connected,
            Phase::Connecting | Phase::RetryWait => LinkStatus::Connecting,
            Phase::Idle | Phase::Exhausted => LinkStatus::Exhausted,
        }
    }
}
