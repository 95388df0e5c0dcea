//! Tether Core
//!
//! This crate provides the runtime behind the Tether remote-control page.
//! It keeps a small set of named values in sync with a remote process over a
//! persistent socket, and keeps the DOM in sync with those values through
//! declarative attribute bindings. It implements:
//!
//! - Reactive primitives (signals, effects, keyed stores) with dependency
//!   capture
//! - A one-pass binding compiler for `!binding` and `@event` attributes
//! - A reconnecting state-sync client and its WebSocket driver
//!
//! # Architecture
//!
//! - `reactive`: signals, evaluation context, effects, stores
//! - `dom`: the element abstraction bindings write into
//! - `binding`: handler registry and compiler
//! - `sync`: protocol, connection state machine, client, tokio driver
//! - `app`: startup wiring
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tether_core::binding::{BindingCompiler, HandlerRegistry, Scope};
//! use tether_core::dom::{MemoryDocument, MemoryElement};
//! use tether_core::reactive::ReactiveStore;
//!
//! let state = ReactiveStore::with_initial([("media-title", json!("Intro"))]);
//! let registry = HandlerRegistry::new()
//!     .expression("title", |scope, cx| scope.state("media-title", cx));
//!
//! let doc = MemoryDocument::new();
//! let heading = doc.append(MemoryElement::new("h1").attr("!innerhtml", "title"));
//!
//! let scope = Scope::new(ReactiveStore::new(), state.clone());
//! let report = BindingCompiler::new(&registry, scope).compile(&doc);
//! assert!(report.is_clean());
//!
//! state.set("media-title", json!("Outro"));
//! assert_eq!(heading.inner_html(), "Outro");
//! ```

pub mod app;
pub mod binding;
pub mod dom;
pub mod error;
pub mod reactive;
pub mod sync;

pub use app::{App, Mounted};
pub use error::{CompileError, ConfigError, EvalError, ProtocolError, StoreError, TransportError};
