use super::core::Deferred;
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

/// The settle capability of one deferred value.
///
/// Handed to executors and returned by [`pair`](super::pair). It can
/// resolve or reject its value and exposes nothing else. All clones share
/// one claim: the first `resolve` or `reject` on any of them takes effect,
/// every later call is a no-op that returns `false`.
#[derive(Clone)]
pub struct Resolver {
    deferred: Deferred,
}

impl Resolver {
    pub(crate) fn new(deferred: Deferred) -> Self {
        Self { deferred }
    }

    /// Fulfills the value with `value`.
    ///
    /// If `value` is a [`Deferred`], the value instead follows it and
    /// settles the same way once it does.
    pub fn resolve(&self, value: impl Into<Value>) -> bool {
        if !self.deferred.claim() {
            tracing::trace!(deferred = self.deferred.id(), "resolve ignored, already claimed");
            return false;
        }

        self.deferred.settle_success(value.into());
        true
    }

    /// Rejects the value with `reason`.
    pub fn reject(&self, reason: impl Into<Value>) -> bool {
        if !self.deferred.claim() {
            tracing::trace!(deferred = self.deferred.id(), "reject ignored, already claimed");
            return false;
        }

        self.deferred.settle_failure(reason.into());
        true
    }

    /// Returns `true` if this resolver settles `deferred`.
    pub(super) fn targets(&self, deferred: &Deferred) -> bool {
        self.deferred.ptr_eq(deferred)
    }

    pub(super) fn id(&self) -> u64 {
        self.deferred.id()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("deferred", &self.deferred.id())
            .finish()
    }
}

/// A continuation callback handed to a foreign [`Thenable`](crate::Thenable).
///
/// Cheap to clone, callable any number of times from any thread.
#[derive(Clone)]
pub struct Callback {
    inner: Arc<dyn Fn(Value) + Send + Sync>,
}

impl Callback {
    pub(crate) fn new(f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Invokes the callback with `value`.
    pub fn call(&self, value: impl Into<Value>) {
        (self.inner)(value.into())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}
