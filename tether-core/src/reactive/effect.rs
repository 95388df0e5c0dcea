//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever a signal
//! it read during its first run changes. Every DOM binding is one effect.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function once under a capturing
//!    [`ReactiveContext`]. Each store key observed during that run gets the
//!    effect's subscriber appended to its signal.
//!
//! 2. When any of those signals is set, the subscriber re-runs the function
//!    synchronously with an untracked context.
//!
//! 3. Dependencies are never re-captured. An effect only reacts to what it
//!    read the first time.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::warn;

use super::context::ReactiveContext;
use super::subscriber::{Subscriber, SubscriberId};

/// Counter for generating unique effect IDs.
static EFFECT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique effect ID.
fn next_effect_id() -> u64 {
    EFFECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

type EffectFn<E> = dyn Fn(&ReactiveContext) -> Result<(), E> + Send + Sync;

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tether_core::reactive::{Effect, ReactiveStore};
/// use tether_core::StoreError;
///
/// let state = ReactiveStore::with_initial([("volume", json!(10))]);
/// let store = state.clone();
/// let effect = Effect::try_new(move |cx| {
///     println!("volume is {}", store.observe("volume", cx)?);
///     Ok::<(), StoreError>(())
/// })
/// .unwrap();
///
/// state.set("volume", json!(20)); // prints "volume is 20"
/// assert_eq!(effect.run_count(), 2);
/// ```
pub struct Effect {
    /// Unique identifier for this effect.
    id: u64,

    /// The subscriber registered on every captured signal.
    subscriber_id: SubscriberId,

    /// Keys read during the capturing run, one entry per read.
    dependencies: Arc<Vec<String>>,

    /// Whether the effect has been disposed.
    disposed: Arc<AtomicBool>,

    /// Number of times the effect has run.
    run_count: Arc<AtomicUsize>,
}

impl Effect {
    /// Create an effect and run it once to capture its dependencies.
    ///
    /// If the first run fails the error is returned. Subscriptions made
    /// before the failure stay registered, since signals cannot drop
    /// subscribers; later runs are still attempted and their failures
    /// logged.
    pub fn try_new<F, E>(run: F) -> Result<Self, E>
    where
        F: Fn(&ReactiveContext) -> Result<(), E> + Send + Sync + 'static,
        E: Display + 'static,
    {
        let id = next_effect_id();
        let run: Arc<EffectFn<E>> = Arc::new(run);
        let disposed = Arc::new(AtomicBool::new(false));
        let run_count = Arc::new(AtomicUsize::new(1));

        let subscriber = {
            let run = Arc::clone(&run);
            let disposed = Arc::clone(&disposed);
            let run_count = Arc::clone(&run_count);
            Subscriber::new(move || {
                if disposed.load(Ordering::SeqCst) {
                    return;
                }
                run_count.fetch_add(1, Ordering::SeqCst);
                if let Err(err) = run(&ReactiveContext::untracked()) {
                    warn!(effect = id, error = %err, "effect re-run failed");
                }
            })
        };
        let subscriber_id = subscriber.id();

        let (result, dependencies) = ReactiveContext::run_capturing(subscriber, |cx| run(cx));
        result?;

        Ok(Self {
            id,
            subscriber_id,
            dependencies: Arc::new(dependencies),
            disposed,
            run_count,
        })
    }

    /// Create an effect from an infallible function.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&ReactiveContext) + Send + Sync + 'static,
    {
        match Self::try_new(move |cx| {
            run(cx);
            Ok::<(), std::convert::Infallible>(())
        }) {
            Ok(effect) => effect,
            Err(never) => match never {},
        }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    /// Keys captured on the first run.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Get the number of captured reads.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Stop reacting to notifications.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.run_count.load(Ordering::SeqCst)
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            subscriber_id: self.subscriber_id,
            dependencies: Arc::clone(&self.dependencies),
            disposed: Arc::clone(&self.disposed),
            run_count: Arc::clone(&self.run_count),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
