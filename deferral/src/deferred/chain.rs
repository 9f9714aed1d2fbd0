use super::core::{Deferred, Reaction, panic_reason};
use super::resolver::Resolver;
use super::unwrap::resolve_with;
use crate::value::Value;

use std::panic::{self, AssertUnwindSafe};

/// A reaction handler.
///
/// `Ok(x)` is the handler's result, unwrapped into the chained value.
/// `Err(reason)` means the handler raised `reason`, which rejects it.
pub type Handler = Box<dyn FnOnce(Value) -> Result<Value, Value> + Send + 'static>;

impl Deferred {
    /// Attaches a pair of handlers and returns the value they settle.
    ///
    /// A missing success handler passes the value through unchanged, a
    /// missing failure handler re-raises the reason unchanged. The handler
    /// matching the eventual outcome runs once, through the scheduler, and
    /// never before this call returns, even if `self` is already settled.
    pub fn attach(&self, on_success: Option<Handler>, on_failure: Option<Handler>) -> Deferred {
        let on_success: Handler = match on_success {
            Some(handler) => handler,
            None => Box::new(|value: Value| -> Result<Value, Value> { Ok(value) }),
        };
        let on_failure: Handler = match on_failure {
            Some(handler) => handler,
            None => Box::new(|reason: Value| -> Result<Value, Value> { Err(reason) }),
        };

        let downstream = Deferred::pending(self.handle().clone());
        let resolver = Resolver::new(downstream.clone());

        tracing::trace!(
            deferred = self.id(),
            downstream = downstream.id(),
            "reactions attached"
        );

        self.observe(
            react(on_success, resolver.clone()),
            react(on_failure, resolver),
        );

        downstream
    }

    /// Attaches both a success and a failure handler.
    pub fn then<S, F>(&self, on_success: S, on_failure: F) -> Deferred
    where
        S: FnOnce(Value) -> Result<Value, Value> + Send + 'static,
        F: FnOnce(Value) -> Result<Value, Value> + Send + 'static,
    {
        self.attach(Some(Box::new(on_success)), Some(Box::new(on_failure)))
    }

    /// Attaches a success handler only; failures pass through.
    pub fn and_then<S>(&self, on_success: S) -> Deferred
    where
        S: FnOnce(Value) -> Result<Value, Value> + Send + 'static,
    {
        self.attach(Some(Box::new(on_success)), None)
    }

    /// Attaches a failure handler only; successes pass through.
    pub fn catch<F>(&self, on_failure: F) -> Deferred
    where
        F: FnOnce(Value) -> Result<Value, Value> + Send + 'static,
    {
        self.attach(None, Some(Box::new(on_failure)))
    }
}

/// Wraps a handler into a reaction feeding `resolver`.
///
/// A raise, returned as `Err` or as a panic, rejects the chained value and
/// never escapes the scheduled job.
fn react(handler: Handler, resolver: Resolver) -> Reaction {
    Box::new(move |value| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| handler(value)))
            .unwrap_or_else(|payload| Err(panic_reason(payload)));

        match result {
            Ok(x) => resolve_with(&resolver, x),
            Err(reason) => {
                resolver.reject(reason);
            }
        }
    })
}
