use super::core::Deferred;
use super::resolver::Resolver;
use crate::scheduler::Handle;
use crate::value::Value;

/// A fresh pending value bundled with its resolver.
///
/// Lets code outside an executor settle the value later.
#[derive(Debug, Clone)]
pub struct DeferredPair {
    /// The pending value.
    pub deferred: Deferred,

    /// The only capability able to settle `deferred`.
    pub resolver: Resolver,
}

impl DeferredPair {
    pub(crate) fn new_in(handle: &Handle) -> Self {
        let deferred = Deferred::pending(handle.clone());
        let resolver = Resolver::new(deferred.clone());

        Self { deferred, resolver }
    }

    /// Shorthand for `self.resolver.resolve(value)`.
    pub fn resolve(&self, value: impl Into<Value>) -> bool {
        self.resolver.resolve(value)
    }

    /// Shorthand for `self.resolver.reject(reason)`.
    pub fn reject(&self, reason: impl Into<Value>) -> bool {
        self.resolver.reject(reason)
    }

    /// Splits the pair into its value and resolver.
    pub fn into_parts(self) -> (Deferred, Resolver) {
        (self.deferred, self.resolver)
    }
}

/// Creates a pending value and its resolver on the current scheduler.
///
/// # Panics
///
/// Panics if no scheduler is in context; see [`Handle::current`].
pub fn pair() -> DeferredPair {
    Handle::current().pair()
}
