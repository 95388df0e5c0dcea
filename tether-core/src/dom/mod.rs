//! DOM Abstraction
//!
//! The binding compiler never touches a concrete DOM. It sees elements
//! through the [`Element`] trait and walks a document through [`Root`].
//! A browser embedder implements these over its own node handles; the
//! [`memory`] module provides a headless document for tests and native
//! embedders.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub use memory::{MemoryDocument, MemoryElement};

/// A name/value attribute pair as written in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    /// The DOM event name, e.g. `click` or `change`.
    pub name: String,
    /// Event payload; for inputs this is typically the new value.
    pub detail: Value,
}

impl DomEvent {
    pub fn new(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }
}

/// An event listener attached to an element.
pub type Listener = Arc<dyn Fn(&DomEvent) + Send + Sync>;

/// The element operations bindings and events need.
pub trait Element: Send + Sync {
    /// The element's tag name.
    fn tag(&self) -> String;

    /// Attributes in markup order.
    fn attributes(&self) -> Vec<Attribute>;

    /// Replace the element's rendered inner content.
    fn set_inner_html(&self, html: &str);

    /// Set the element's input value.
    fn set_value(&self, value: &str);

    /// Show or hide the element.
    fn set_hidden(&self, hidden: bool);

    /// Attach a plain listener for the named event.
    fn add_event_listener(&self, event: &str, listener: Listener);
}

impl fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element").field("tag", &self.tag()).finish()
    }
}

/// A subtree the compiler can scan.
pub trait Root {
    /// Every element under the root, in document order.
    fn descendants(&self) -> Vec<Arc<dyn Element>>;
}
