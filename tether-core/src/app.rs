//! Startup wiring.
//!
//! Mirrors the page lifecycle: create the UI and state stores, compile the
//! document's bindings once, then open the socket.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::binding::{BindingCompiler, CompileReport, HandlerRegistry, Scope};
use crate::dom::Root;
use crate::reactive::ReactiveStore;
use crate::sync::{ClientConfig, Connector, RetryScheduler, SyncClient};

/// Builder for a mounted page.
#[derive(Debug, Clone, Default)]
pub struct App {
    config: ClientConfig,
    ui: Vec<(String, Value)>,
    state: Vec<(String, Value)>,
}

impl App {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Initial UI-local entry.
    pub fn ui(mut self, key: impl Into<String>, value: Value) -> Self {
        self.ui.push((key.into(), value));
        self
    }

    /// Initial state entry. Every key a binding reads must be declared here.
    /// A binding that reads an undeclared key fails on its first evaluation,
    /// is reported in [`CompileReport::failures`], and is never installed,
    /// even if the server sends the key later.
    pub fn state(mut self, key: impl Into<String>, value: Value) -> Self {
        self.state.push((key.into(), value));
        self
    }

    /// Create the stores, compile `root`, and connect.
    pub fn mount(
        self,
        root: &dyn Root,
        registry: &HandlerRegistry,
        connector: Arc<dyn Connector>,
        scheduler: Arc<dyn RetryScheduler>,
    ) -> Mounted {
        let ui = ReactiveStore::with_initial(self.ui);
        let state = ReactiveStore::with_initial(self.state);
        let client = Arc::new(SyncClient::new(
            self.config,
            ui.clone(),
            state.clone(),
            connector,
            scheduler,
        ));

        let scope = Scope::new(ui.clone(), state.clone()).with_client(Arc::clone(&client));
        let report = BindingCompiler::new(registry, scope).compile(root);
        info!(
            bindings = report.bindings.len(),
            events = report.events,
            failures = report.failures.len(),
            "mounted"
        );

        client.connect();
        Mounted {
            ui,
            state,
            client,
            report,
        }
    }
}

/// A compiled, connecting page.
#[derive(Debug)]
pub struct Mounted {
    pub ui: ReactiveStore,
    pub state: ReactiveStore,
    pub client: Arc<SyncClient>,
    pub report: CompileReport,
}
