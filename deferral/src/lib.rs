//! # deferral
//!
//! **deferral** is a deferred-value engine: a promise-style [`Deferred`]
//! that settles once, to a success value or a failure reason, and lets
//! consumers chain reactions that produce further deferred values.
//!
//! The engine guarantees that:
//!
//! - a value settles **at most once**, and only the first settle call counts,
//! - reactions run **asynchronously**, through a [`Schedule`] implementation,
//!   never on the stack that attached them or settled the value,
//! - reactions queued on one value run **in attachment order**,
//! - settling with another [`Deferred`] **adopts** its eventual outcome,
//! - foreign [`Thenable`] objects are unwrapped defensively: callbacks fire
//!   at most once and late failures are ignored,
//! - a reaction that returns the value it is meant to settle rejects it with
//!   a type error instead of looping.
//!
//! ## Quick Start
//!
//! ```rust
//! use deferral::{EventLoop, Outcome, Value};
//!
//! let event_loop = EventLoop::new_default().unwrap();
//! let handle = event_loop.handle();
//!
//! let doubled = handle
//!     .deferred(|resolver| {
//!         resolver.resolve(21);
//!         Ok(())
//!     })
//!     .and_then(|v| Ok(Value::from(v.as_number().unwrap_or_default() * 2.0)));
//!
//! let outcome = event_loop.block_on(&doubled).unwrap();
//! assert_eq!(outcome, Outcome::Fulfilled(Value::from(42)));
//! ```
//!
//! ## Modules
//!
//! - `deferred`: settle procedures, chaining, unwrapping
//! - `scheduler`: the trampoline contract, [`Trampoline`] and [`EventLoop`]
//! - `value`: the dynamic [`Value`] model and the [`Thenable`] trait
//!
//! ## Testing
//!
//! [`Trampoline`] runs jobs only when asked, which makes every
//! interleaving reproducible. `#[deferral::test]` runs a function returning
//! a [`Deferred`] on a fresh [`EventLoop`] and fails if it rejects.

mod deferred;
mod error;
mod scheduler;
mod value;

pub use deferred::{Callback, Deferred, DeferredPair, Handler, Outcome, Resolver, State, pair};
pub use error::{Error, Result};
pub use scheduler::{EventLoop, EventLoopBuilder, Handle, Job, Schedule, Trampoline};
pub use value::{Thenable, Value};

pub use deferral_macros::test;
