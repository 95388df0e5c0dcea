//! Headless in-memory document.
//!
//! Elements hold their attributes, rendered content, input value, hidden
//! flag and listeners behind locks so bindings can write into them from any
//! subscriber callback.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::{Attribute, DomEvent, Element, Listener, Root};

/// A flat, ordered document of [`MemoryElement`]s.
#[derive(Default)]
pub struct MemoryDocument {
    elements: RwLock<Vec<Arc<MemoryElement>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return a handle to it.
    pub fn append(&self, element: MemoryElement) -> Arc<MemoryElement> {
        let element = Arc::new(element);
        self.elements.write().push(Arc::clone(&element));
        element
    }

    /// Find the first element carrying `id="..."`.
    pub fn element_by_id(&self, id: &str) -> Option<Arc<MemoryElement>> {
        self.elements
            .read()
            .iter()
            .find(|el| el.attribute("id").as_deref() == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }
}

impl Root for MemoryDocument {
    fn descendants(&self) -> Vec<Arc<dyn Element>> {
        self.elements
            .read()
            .iter()
            .map(|el| Arc::clone(el) as Arc<dyn Element>)
            .collect()
    }
}

#[derive(Default)]
struct ElementState {
    inner_html: String,
    value: String,
    hidden: bool,
}

/// A single element of a [`MemoryDocument`].
pub struct MemoryElement {
    tag: String,
    attributes: Vec<Attribute>,
    state: Mutex<ElementState>,
    listeners: Mutex<Vec<(String, Listener)>>,
}

impl MemoryElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            state: Mutex::new(ElementState::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Add an attribute. Attributes keep the order they were added in.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Start out hidden, like markup carrying the `hidden` attribute.
    pub fn hidden(self) -> Self {
        self.state.lock().hidden = true;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.clone())
    }

    pub fn inner_html(&self) -> String {
        self.state.lock().inner_html.clone()
    }

    pub fn value(&self) -> String {
        self.state.lock().value.clone()
    }

    pub fn is_hidden(&self) -> bool {
        self.state.lock().hidden
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Fire `event` at every listener registered for its name.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &DomEvent) -> usize {
        let matching: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(name, _)| *name == event.name)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &matching {
            listener(event);
        }
        matching.len()
    }
}

impl Element for MemoryElement {
    fn tag(&self) -> String {
        self.tag.clone()
    }

    fn attributes(&self) -> Vec<Attribute> {
        self.attributes.clone()
    }

    fn set_inner_html(&self, html: &str) {
        self.state.lock().inner_html = html.to_owned();
    }

    fn set_value(&self, value: &str) {
        self.state.lock().value = value.to_owned();
    }

    fn set_hidden(&self, hidden: bool) {
        self.state.lock().hidden = hidden;
    }

    fn add_event_listener(&self, event: &str, listener: Listener) {
        self.listeners.lock().push((event.to_owned(), listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn document_lists_elements_in_order() {
        let doc = MemoryDocument::new();
        doc.append(MemoryElement::new("div").attr("id", "first"));
        doc.append(MemoryElement::new("span").attr("id", "second"));

        let tags: Vec<String> = doc.descendants().iter().map(|el| el.tag()).collect();
        assert_eq!(tags, vec!["div", "span"]);
        assert!(doc.element_by_id("second").is_some());
        assert!(doc.element_by_id("third").is_none());
    }

    #[test]
    fn dispatch_only_reaches_matching_listeners() {
        let el = MemoryElement::new("button");
        let clicks = Arc::new(AtomicI32::new(0));
        let clicks_clone = clicks.clone();
        el.add_event_listener(
            "click",
            Arc::new(move |_| {
                clicks_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(el.dispatch(&DomEvent::new("click", json!(null))), 1);
        assert_eq!(el.dispatch(&DomEvent::new("input", json!(null))), 0);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn setters_leave_attributes_alone() {
        let el = MemoryElement::new("input").attr("class", "slider").hidden();
        assert!(el.is_hidden());

        el.set_value("42");
        el.set_hidden(false);

        assert_eq!(el.value(), "42");
        assert!(!el.is_hidden());
        assert_eq!(el.attributes(), vec![Attribute::new("class", "slider")]);
    }
}
