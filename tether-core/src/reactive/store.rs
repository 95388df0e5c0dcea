//! Reactive Store
//!
//! A store is a collection of named signals holding JSON values. Keys are
//! created lazily: the first write to a key creates its signal, and every
//! later write goes through that same signal so subscriptions stay valid.
//!
//! Reads come in two forms. [`ReactiveStore::get`] is a plain read;
//! [`ReactiveStore::observe`] also subscribes the context's binding when the
//! context is capturing. Reading a key that was never written is a
//! programming error and fails with [`StoreError::UndefinedKey`].

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::trace;

use super::{ReactiveContext, Signal};
use crate::error::StoreError;

/// A dynamic collection of named JSON signals.
///
/// Cloning yields another handle to the same store.
#[derive(Clone, Default)]
pub struct ReactiveStore {
    signals: Arc<RwLock<IndexMap<String, Signal<Value>>>>,
}

impl ReactiveStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given initial entries.
    pub fn with_initial<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let store = Self::new();
        for (key, value) in entries {
            store.set(key, value);
        }
        store
    }

    /// Create a store from a JSON object. Non-object values yield an empty
    /// store.
    pub fn from_json(initial: &Value) -> Self {
        match initial.as_object() {
            Some(map) => Self::with_initial(map.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => Self::new(),
        }
    }

    /// Read a key without subscribing.
    pub fn get(&self, key: &str) -> Result<Value, StoreError> {
        self.signal(key)
            .map(|signal| signal.get())
            .ok_or_else(|| StoreError::UndefinedKey(key.to_owned()))
    }

    /// Read a key, subscribing the context's binding if it is capturing.
    ///
    /// Every call subscribes again, so an expression that reads the same key
    /// twice is notified twice per write.
    pub fn observe(&self, key: &str, ctx: &ReactiveContext) -> Result<Value, StoreError> {
        let signal = self
            .signal(key)
            .ok_or_else(|| StoreError::UndefinedKey(key.to_owned()))?;

        if let Some(subscriber) = ctx.subscriber() {
            signal.subscribe(subscriber.clone());
            ctx.track_dependency(key);
        }

        Ok(signal.get())
    }

    /// Write a key.
    ///
    /// An existing key notifies its subscribers, even if the value is
    /// unchanged. A new key is created silently.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        // Notify with no store lock held: subscribers read this store.
        let existing = {
            let mut signals = self.signals.write();
            match signals.entry(key) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => {
                    trace!(key = %entry.key(), "creating store key");
                    entry.insert(Signal::new(value));
                    return;
                }
            }
        };
        existing.set(value);
    }

    /// Rewrite an existing key from its current value. Notifies like
    /// [`set`](Self::set).
    pub fn update<F>(&self, key: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&Value) -> Value,
    {
        let signal = self
            .signal(key)
            .ok_or_else(|| StoreError::UndefinedKey(key.to_owned()))?;
        signal.update(f);
        Ok(())
    }

    /// Write every entry of `entries`, one `set` per key, in order.
    pub fn merge(&self, entries: &Map<String, Value>) {
        for (key, value) in entries {
            self.set(key.clone(), value.clone());
        }
    }

    /// The signal backing `key`, if it has been written.
    pub fn signal(&self, key: &str) -> Option<Signal<Value>> {
        self.signals.read().get(key).cloned()
    }

    /// Check whether `key` has been written.
    pub fn contains(&self, key: &str) -> bool {
        self.signals.read().contains_key(key)
    }

    /// Keys in first-write order.
    pub fn keys(&self) -> Vec<String> {
        self.signals.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.signals.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.read().is_empty()
    }
}

impl std::fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("keys", &self.keys())
            .finish()
    }
}
