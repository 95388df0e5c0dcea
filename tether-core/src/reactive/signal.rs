//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive: one value cell plus an
//! ordered list of subscribers.
//!
//! # How Signals Work
//!
//! 1. Reading a signal has no effect on its subscribers. Subscriptions are
//!    added explicitly, usually by [`ReactiveStore::observe`] while a binding
//!    is being captured.
//!
//! 2. Every `set` stores the value and then runs each subscriber, in the
//!    order they subscribed, before returning. There is no equality check:
//!    writing the same value twice notifies twice.
//!
//! 3. A subscriber that writes another signal causes nested, fully
//!    sequential notification. Nothing is batched or coalesced.
//!
//! # Locking
//!
//! The value and the subscriber list sit behind separate locks, and neither
//! lock is held while subscribers run. The subscriber list is snapshotted
//! first so callbacks may freely read, write or subscribe to this signal.
//!
//! [`ReactiveStore::observe`]: super::ReactiveStore::observe

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::Subscriber;

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique signal ID.
fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Most signals back a handful of bindings.
type SubscriberList = SmallVec<[Subscriber; 4]>;

/// A reactive signal holding a value of type T.
///
/// # Example
///
/// ```rust
/// use tether_core::reactive::{Signal, Subscriber};
///
/// let volume = Signal::new(50);
/// volume.subscribe(Subscriber::new(|| println!("volume changed")));
///
/// volume.set(70); // prints "volume changed"
/// assert_eq!(volume.get(), 70);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this signal.
    id: u64,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// Subscribers in registration order. Duplicates are allowed.
    subscribers: Arc<RwLock<SubscriberList>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value and no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            id: next_signal_id(),
            value: Arc::new(RwLock::new(value)),
            subscribers: Arc::new(RwLock::new(SmallVec::new())),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Set a new value and notify every subscriber, in order.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.notify_subscribers();
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&*self.value.read());
        self.set(new_value);
    }

    /// Append a subscriber.
    ///
    /// No de-duplication is performed, and there is no way to unsubscribe:
    /// bindings live as long as the page.
    pub fn subscribe(&self, subscriber: Subscriber) {
        self.subscribers.write().push(subscriber);
    }

    /// Get the number of registered subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn notify_subscribers(&self) {
        let snapshot: SubscriberList = self.subscribers.read().clone();
        for subscriber in &snapshot {
            subscriber.notify();
        }
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn signal_get_and_set() {
        let signal = Signal::new(0);
        assert_eq!(signal.get(), 0);

        signal.set(42);
        assert_eq!(signal.get(), 42);
    }

    #[test]
    fn signal_update() {
        let signal = Signal::new(10);
        signal.update(|v| v + 5);
        assert_eq!(signal.get(), 15);
    }

    #[test]
    fn signal_notifies_subscribers() {
        let signal = Signal::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();

        signal.subscribe(Subscriber::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        signal.set(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        signal.set(2);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unchanged_value_still_notifies() {
        let signal = Signal::new(7);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();
        signal.subscribe(Subscriber::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        signal.set(7);
        signal.set(7);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let signal = Signal::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order = order.clone();
            signal.subscribe(Subscriber::new(move || order.lock().push(tag)));
        }

        signal.set(1);
        signal.set(2);
        assert_eq!(*order.lock(), vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn same_subscriber_twice_runs_twice() {
        let signal = Signal::new(0);
        let call_count = Arc::new(AtomicI32::new(0));
        let call_count_clone = call_count.clone();
        let subscriber = Subscriber::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        signal.subscribe(subscriber.clone());
        signal.subscribe(subscriber);
        assert_eq!(signal.subscriber_count(), 2);

        signal.set(1);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscriber_may_write_another_signal() {
        let source = Signal::new(1);
        let mirror = Signal::new(0);

        let source_clone = source.clone();
        let mirror_clone = mirror.clone();
        source.subscribe(Subscriber::new(move || {
            mirror_clone.set(source_clone.get() * 10);
        }));

        source.set(4);
        assert_eq!(mirror.get(), 40);
    }

    #[test]
    fn signal_clone_shares_state() {
        let signal1 = Signal::new(0);
        let signal2 = signal1.clone();

        signal1.set(42);
        assert_eq!(signal2.get(), 42);
        assert_eq!(signal1.id(), signal2.id());
    }

    #[test]
    fn signal_ids_are_unique() {
        let s1 = Signal::new(0);
        let s2 = Signal::new(0);
        assert_ne!(s1.id(), s2.id());
    }
}
