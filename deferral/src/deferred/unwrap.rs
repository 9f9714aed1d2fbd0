//! Decides how a reaction's result becomes the outcome of the value it was
//! chained into.
//!
//! The checks run in a fixed order and the first match wins:
//! 1. the value it is meant to settle: a type error,
//! 2. another deferred value: follow it,
//! 3. a thenable: call its `then` behind a one-shot latch,
//! 4. anything else: fulfill with it.

use super::resolver::{Callback, Resolver};
use crate::error::Error;
use crate::value::{Thenable, Value};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub(super) fn resolve_with(resolver: &Resolver, x: Value) {
    match x {
        Value::Deferred(ref target) if resolver.targets(target) => {
            tracing::trace!(deferred = resolver.id(), "chaining cycle");
            resolver.reject(Error::Type(format!(
                "chaining cycle detected for deferred #{}",
                resolver.id()
            )));
        }
        Value::Deferred(source) => {
            let on_fulfilled = resolver.clone();
            let on_rejected = resolver.clone();
            source.observe(
                Box::new(move |value| {
                    on_fulfilled.resolve(value);
                }),
                Box::new(move |reason| {
                    on_rejected.reject(reason);
                }),
            );
        }
        Value::Thenable(thenable) => resolve_thenable(resolver, thenable),
        plain => {
            resolver.resolve(plain);
        }
    }
}

/// Calls a foreign `then`. Only the first callback invocation counts, and a
/// failure of `then` after that invocation is ignored.
fn resolve_thenable(resolver: &Resolver, thenable: Arc<dyn Thenable>) {
    let called = Arc::new(AtomicBool::new(false));

    let on_fulfilled = {
        let called = called.clone();
        let resolver = resolver.clone();
        Callback::new(move |value| {
            if called.swap(true, Ordering::AcqRel) {
                return;
            }
            resolve_with(&resolver, value);
        })
    };

    let on_rejected = {
        let called = called.clone();
        let resolver = resolver.clone();
        Callback::new(move |reason| {
            if called.swap(true, Ordering::AcqRel) {
                return;
            }
            resolver.reject(reason);
        })
    };

    if let Err(reason) = thenable.then(on_fulfilled, on_rejected) {
        if called.swap(true, Ordering::AcqRel) {
            tracing::trace!(deferred = resolver.id(), "thenable failed after settling, ignored");
            return;
        }

        resolver.reject(reason);
    }
}
