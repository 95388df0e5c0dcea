//! Reactive Primitives
//!
//! This module implements the reactive core: signals, subscribers, the
//! evaluation context, effects and the keyed store built on top of them.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state with an ordered subscriber
//! list. Setting a signal runs every subscriber synchronously.
//!
//! ## Stores
//!
//! A ReactiveStore maps string keys to JSON signals, created on first write.
//! The page keeps two: UI-local flags and the remote player state.
//!
//! ## Effects
//!
//! An Effect runs once under a capturing [`ReactiveContext`] to discover
//! which store keys it reads, then re-runs whenever one of them is written.
//! Bindings are effects that write into a DOM element.
//!
//! # Implementation Notes
//!
//! Dependency capture is explicit. Expressions receive the context as a
//! parameter and read through [`ReactiveStore::observe`], which subscribes
//! the context's callback when it is capturing. There is no hidden global
//! "current computation".

mod context;
mod effect;
mod signal;
mod store;
mod subscriber;

pub use context::ReactiveContext;
pub use effect::Effect;
pub use signal::Signal;
pub use store::ReactiveStore;
pub use subscriber::{Subscriber, SubscriberId};
