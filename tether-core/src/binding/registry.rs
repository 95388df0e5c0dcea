//! Named expressions and event handlers.
//!
//! Markup refers to behaviour by name: `!innerhtml="media_title"` looks up
//! the expression `media_title`, `@click="toggle_pause"` the handler
//! `toggle_pause`. Both are plain closures registered up front.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::dom::DomEvent;
use crate::error::EvalError;
use crate::reactive::{ReactiveContext, ReactiveStore};
use crate::sync::{Envelope, SyncClient};

/// A binding expression: reads stores through the context and yields the
/// value to write into the element.
pub type Expression = Arc<dyn Fn(&Scope, &ReactiveContext) -> Result<Value, EvalError> + Send + Sync>;

/// An event handler: runs once per fired DOM event.
pub type EventHandler = Arc<dyn Fn(&Scope, &DomEvent) + Send + Sync>;

/// The globals visible to expressions and handlers.
#[derive(Clone, Debug)]
pub struct Scope {
    /// UI-local flags, e.g. the connection indicator.
    pub ui: ReactiveStore,
    /// State mirrored from the remote process.
    pub state: ReactiveStore,
    client: Option<Arc<SyncClient>>,
}

impl Scope {
    pub fn new(ui: ReactiveStore, state: ReactiveStore) -> Self {
        Self {
            ui,
            state,
            client: None,
        }
    }

    pub fn with_client(mut self, client: Arc<SyncClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn client(&self) -> Option<&Arc<SyncClient>> {
        self.client.as_ref()
    }

    /// Send a command to the remote process. Without a client the envelope
    /// is dropped and logged.
    pub fn send(&self, envelope: Envelope) {
        match &self.client {
            Some(client) => client.send(&envelope),
            None => warn!(event = %envelope.event, "no sync client; dropping envelope"),
        }
    }

    /// Shorthand for a tracked read of the state store.
    pub fn state(&self, key: &str, cx: &ReactiveContext) -> Result<Value, EvalError> {
        Ok(self.state.observe(key, cx)?)
    }

    /// Shorthand for a tracked read of the UI store.
    pub fn ui(&self, key: &str, cx: &ReactiveContext) -> Result<Value, EvalError> {
        Ok(self.ui.observe(key, cx)?)
    }
}

/// Registry of named expressions and event handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    expressions: IndexMap<String, Expression>,
    handlers: IndexMap<String, EventHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding expression under `name`.
    pub fn expression<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Scope, &ReactiveContext) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.expressions.insert(name.into(), Arc::new(f));
        self
    }

    /// Register an event handler under `name`.
    pub fn handler<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Scope, &DomEvent) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get_expression(&self, name: &str) -> Option<Expression> {
        self.expressions.get(name).cloned()
    }

    pub fn get_handler(&self, name: &str) -> Option<EventHandler> {
        self.handlers.get(name).cloned()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("expressions", &self.expressions.keys().collect::<Vec<_>>())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
