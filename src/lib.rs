//! # Contract Registry
//!
//! A type-and-label keyed service locator. Application startup code registers
//! concrete implementations under an abstract contract type (optionally
//! distinguished by a string label); unrelated code later resolves them by
//! type and label without knowing any construction details.
//!
//! Three registration strategies are supported:
//!
//! - **fixed instance** — [`Registry::register`] / [`Registry::register_arc`]:
//!   every lookup returns the same already-built instance;
//! - **eager singleton** — [`Registry::register_constructed`]: a constructor is
//!   resolved by argument count and invoked once at registration, and every
//!   lookup returns that one instance;
//! - **per-call factory** — [`Registry::register_factory`]: the resolved
//!   constructor and its argument list are stored, and every lookup runs the
//!   constructor again, producing a fresh instance.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use contract_registry::Registry;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) -> String {
//!         format!("[console] {msg}")
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .register_arc_labeled::<dyn Logger>("console", Arc::new(ConsoleLogger))
//!     .unwrap();
//!
//! // Elsewhere, with no knowledge of ConsoleLogger:
//! let logger = registry.get_labeled::<dyn Logger>("console").unwrap();
//! assert_eq!(logger.log("up"), "[console] up");
//! assert!(!registry.contains_labeled::<dyn Logger>("file"));
//! ```
//!
//! ## Design
//!
//! - The registry is an explicit value with a defined owner, not an implicit
//!   process-wide static. Share it by reference or `Arc<Registry>`; every
//!   operation is lock-guarded and safe across threads. A process-wide module
//!   is still available via [`define_registry!`] when one is wanted.
//! - Construction is expressed as statically-typed closures in a
//!   [`ConstructorTable`], resolved by argument count alone (first declared
//!   constructor with a matching arity wins — see the `constructor` module
//!   docs for the inherited ambiguity).
//! - Retrieval performs a checked downcast through a type token
//!   ([`ContractId`]); there are no unchecked casts anywhere.
//! - Lookups are soft: a missing key is `None`, never an error. Registration
//!   failures ([`RegistryError`]) are synchronous and never mutate the store.
//! - Enumeration ([`Registry::get_all`], [`Registry::registered_types`])
//!   invokes every matching provider, so factory entries construct a fresh
//!   instance per enumeration. This forcing behavior is deliberate and never
//!   cached.

mod constructor;
mod key;
mod macros;
mod provider;
mod registry;
mod registry_error;

pub use constructor::{Arg, Args, ConstructorFn, ConstructorTable};
pub use key::{ContractId, Key};
pub use provider::{Instance, Upcasts};
pub use registry::Registry;
pub use registry_error::RegistryError;
