//! Binding Compiler
//!
//! One pass over a document that wires attribute-tagged elements up:
//!
//! - `!<kind>="<expression>"` installs a reactive binding. The expression
//!   runs once under a capturing context, its result is written into the
//!   element, and the write is repeated whenever a key it read changes.
//! - `@<event>="<handler>"` attaches a plain listener for `<event>` that
//!   calls the handler. Listeners are not reactive.
//!
//! A binding or handler that cannot be installed is recorded in the
//! [`CompileReport`] and logged; the rest of the pass carries on.

use std::sync::Arc;

use tracing::{debug, warn};

use super::kind::{BindingKind, BINDING_SIGIL, EVENT_SIGIL};
use super::registry::{HandlerRegistry, Scope};
use crate::dom::{Attribute, Element, Listener, Root};
use crate::error::{CompileError, EvalError};
use crate::reactive::Effect;

/// Elements found by [`BindingCompiler::scan`]. An element carrying both
/// kinds of attribute appears in both lists.
#[derive(Debug, Default)]
pub struct TaggedElements {
    pub events: Vec<Arc<dyn Element>>,
    pub bindings: Vec<Arc<dyn Element>>,
}

/// Outcome of a compile pass.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Installed reactive bindings.
    pub bindings: Vec<Effect>,
    /// Number of listeners attached.
    pub events: usize,
    /// Attributes that could not be installed.
    pub failures: Vec<CompileError>,
}

impl CompileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compiles tagged attributes against a handler registry.
#[derive(Debug)]
pub struct BindingCompiler<'a> {
    registry: &'a HandlerRegistry,
    scope: Scope,
}

impl<'a> BindingCompiler<'a> {
    pub fn new(registry: &'a HandlerRegistry, scope: Scope) -> Self {
        Self { registry, scope }
    }

    /// Partition the elements under `root` by the sigils they carry.
    pub fn scan(root: &dyn Root) -> TaggedElements {
        let mut tagged = TaggedElements::default();
        for element in root.descendants() {
            let attributes = element.attributes();
            if attributes.iter().any(|a| a.name.starts_with(EVENT_SIGIL)) {
                tagged.events.push(Arc::clone(&element));
            }
            if attributes.iter().any(|a| a.name.starts_with(BINDING_SIGIL)) {
                tagged.bindings.push(element);
            }
        }
        tagged
    }

    /// Scan `root` once and install every binding and event listener.
    pub fn compile(&self, root: &dyn Root) -> CompileReport {
        let tagged = Self::scan(root);
        let mut report = CompileReport::default();

        for element in &tagged.bindings {
            for attr in element.attributes() {
                let Some(suffix) = attr.name.strip_prefix(BINDING_SIGIL) else {
                    continue;
                };
                let Some(kind) = BindingKind::from_suffix(suffix) else {
                    continue;
                };
                match self.bind(element, kind, &attr) {
                    Ok(effect) => report.bindings.push(effect),
                    Err(err) => {
                        warn!(error = %err, "skipping binding");
                        report.failures.push(err);
                    }
                }
            }
        }

        for element in &tagged.events {
            for attr in element.attributes() {
                let Some(event) = attr.name.strip_prefix(EVENT_SIGIL) else {
                    continue;
                };
                match self.listen(element, event, &attr) {
                    Ok(()) => report.events += 1,
                    Err(err) => {
                        warn!(error = %err, "skipping event handler");
                        report.failures.push(err);
                    }
                }
            }
        }

        debug!(
            bindings = report.bindings.len(),
            events = report.events,
            failures = report.failures.len(),
            "compiled document"
        );
        report
    }

    fn bind(
        &self,
        element: &Arc<dyn Element>,
        kind: BindingKind,
        attr: &Attribute,
    ) -> Result<Effect, CompileError> {
        let expression = self.registry.get_expression(&attr.value).ok_or_else(|| {
            CompileError::UnknownExpression {
                attribute: attr.name.clone(),
                name: attr.value.clone(),
            }
        })?;

        let element = Arc::clone(element);
        let scope = self.scope.clone();
        Effect::try_new(move |cx| {
            let result = expression(&scope, cx)?;
            kind.apply(element.as_ref(), &result);
            Ok::<(), EvalError>(())
        })
        .map_err(|source| CompileError::Eval {
            attribute: attr.name.clone(),
            source,
        })
    }

    fn listen(
        &self,
        element: &Arc<dyn Element>,
        event: &str,
        attr: &Attribute,
    ) -> Result<(), CompileError> {
        let handler = self.registry.get_handler(&attr.value).ok_or_else(|| {
            CompileError::UnknownHandler {
                attribute: attr.name.clone(),
                name: attr.value.clone(),
            }
        })?;

        let scope = self.scope.clone();
        let listener: Listener = Arc::new(move |event| handler(&scope, event));
        element.add_event_listener(event, listener);
        Ok(())
    }
}
