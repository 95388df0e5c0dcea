//! Declarative bindings.
//!
//! Markup tags elements with `!`-prefixed attributes for reactive one-way
//! bindings and `@`-prefixed attributes for event handlers. Attribute values
//! name closures held in a [`HandlerRegistry`]; the [`BindingCompiler`]
//! resolves them once at startup.

mod compiler;
mod kind;
mod registry;

pub use compiler::{BindingCompiler, CompileReport, TaggedElements};
pub use kind::{is_truthy, render, BindingKind, BINDING_SIGIL, EVENT_SIGIL};
pub use registry::{EventHandler, Expression, HandlerRegistry, Scope};
