//! The deferred-value engine.
//!
//! A [`Deferred`] is a value that becomes available later. It starts
//! pending and settles exactly once, either fulfilled with a value or
//! rejected with a reason. Consumers attach reactions with
//! [`Deferred::attach`] and its sugar, each call producing a new deferred
//! value settled from the reaction's result.
//!
//! The module is split into:
//! - `state`: the lifecycle tag and settled outcome,
//! - `core`: storage, construction, and the settle procedures,
//! - `resolver`: the capabilities handed to executors and thenables,
//! - `chain`: the chaining operator,
//! - `unwrap`: how a reaction's result becomes the next outcome,
//! - `pair`: a fresh value bundled with its resolver,
//! - `future`: `async`/`.await` support.

mod chain;
mod core;
mod future;
mod pair;
mod resolver;
mod state;
mod unwrap;

pub use self::chain::Handler;
pub use self::core::Deferred;
pub use self::pair::{DeferredPair, pair};
pub use self::resolver::{Callback, Resolver};
pub use self::state::{Outcome, State};
