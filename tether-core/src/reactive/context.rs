//! Reactive Context
//!
//! The reactive context tells a store read whether it should subscribe.
//! This is how a binding discovers its dependencies: its expression is run
//! once under a capturing context, and every key it reads registers the
//! binding's subscriber on that key's signal.
//!
//! # Implementation
//!
//! The context is an explicit value handed to every expression evaluator
//! rather than ambient thread-local state. Two contexts never interfere, so
//! nesting one capture inside another is harmless: each read registers the
//! subscriber of the context it was given.
//!
//! Only the first evaluation of a binding captures. Re-runs are evaluated
//! with [`ReactiveContext::untracked`], so a branch that reads a key only on
//! later runs never subscribes to it.

use std::cell::RefCell;

use super::Subscriber;

/// Evaluation context passed to every expression.
#[derive(Debug)]
pub struct ReactiveContext {
    /// The subscriber to register on every observed signal, if capturing.
    subscriber: Option<Subscriber>,
    /// Keys observed during this evaluation, one entry per read.
    dependencies: RefCell<Vec<String>>,
}

impl ReactiveContext {
    /// A context that registers `subscriber` on every observed signal.
    pub fn capturing(subscriber: Subscriber) -> Self {
        Self {
            subscriber: Some(subscriber),
            dependencies: RefCell::new(Vec::new()),
        }
    }

    /// A context that observes nothing.
    pub fn untracked() -> Self {
        Self {
            subscriber: None,
            dependencies: RefCell::new(Vec::new()),
        }
    }

    /// Evaluate `expr` once under a capturing context for `subscriber`.
    ///
    /// Returns the expression's result together with the keys it read.
    pub fn run_capturing<T, F>(subscriber: Subscriber, expr: F) -> (T, Vec<String>)
    where
        F: FnOnce(&ReactiveContext) -> T,
    {
        let ctx = Self::capturing(subscriber);
        let value = expr(&ctx);
        (value, ctx.into_dependencies())
    }

    /// Check whether reads in this context subscribe.
    pub fn is_capturing(&self) -> bool {
        self.subscriber.is_some()
    }

    /// The subscriber being captured, if any.
    pub fn subscriber(&self) -> Option<&Subscriber> {
        self.subscriber.as_ref()
    }

    /// Record a read of `key`. Called by the store when it subscribes.
    pub fn track_dependency(&self, key: &str) {
        if self.is_capturing() {
            self.dependencies.borrow_mut().push(key.to_owned());
        }
    }

    /// Keys observed so far.
    pub fn dependencies(&self) -> Vec<String> {
        self.dependencies.borrow().clone()
    }

    fn into_dependencies(self) -> Vec<String> {
        self.dependencies.into_inner()
    }
}
