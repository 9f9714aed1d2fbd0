//! Scheduling of deferred work.
//!
//! The engine never runs a reaction on the caller's stack. Every reaction and
//! every settlement side effect is handed to a [`Schedule`] implementation as
//! a [`Job`], which must run it later, after the current synchronous segment
//! has returned.
//!
//! Two implementations are provided:
//! - [`Trampoline`]: a manually driven FIFO queue, deterministic and suited
//!   to tests,
//! - [`EventLoop`]: a background worker thread draining a FIFO injector.
//!
//! A [`Handle`] is the cloneable, type-erased view of a scheduler that
//! deferred values hold on to.

mod context;
mod event_loop;
mod trampoline;

pub use event_loop::{EventLoop, EventLoopBuilder};
pub use trampoline::Trampoline;

use crate::deferred::{Deferred, DeferredPair, Resolver};
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The trampoline contract.
///
/// `schedule` must not run `job` before returning to its caller. Jobs
/// submitted one after another from the same thread must run in submission
/// order.
pub trait Schedule: Send + Sync + 'static {
    /// Queues `job` to run later.
    fn schedule(&self, job: Job);
}

/// Shared handle to a scheduler.
///
/// Every [`Deferred`] keeps the handle it was created under and schedules
/// its reactions through it. Values derived by chaining inherit the handle
/// of the value they were chained on.
#[derive(Clone)]
pub struct Handle {
    scheduler: Arc<dyn Schedule>,
}

impl Handle {
    /// Wraps a scheduler into a handle.
    pub fn new<S: Schedule>(scheduler: S) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
        }
    }

    pub(crate) fn from_arc(scheduler: Arc<dyn Schedule>) -> Self {
        Self { scheduler }
    }

    /// Returns the handle installed for the current thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside [`Handle::enter`] and outside a job run by
    /// one of the crate's schedulers.
    pub fn current() -> Self {
        Self::try_current()
            .expect("deferral: no scheduler in context; use Handle::enter or a scheduler job")
    }

    /// Returns the handle installed for the current thread, if any.
    pub fn try_current() -> Option<Self> {
        context::current()
    }

    /// Runs `f` with this handle installed as the current scheduler.
    ///
    /// The previous handle is restored when `f` returns.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        context::enter_context(self.clone(), f)
    }

    /// Submits a job to the underlying scheduler.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        self.scheduler.schedule(Box::new(job));
    }

    /// Creates a deferred value scheduled on this handle.
    ///
    /// `executor` runs synchronously before this method returns. An `Err`
    /// it returns rejects the value, unless the executor already settled it.
    pub fn deferred<F>(&self, executor: F) -> Deferred
    where
        F: FnOnce(Resolver) -> Result<(), Value>,
    {
        Deferred::new_in(self, executor)
    }

    /// Creates a deferred value that fulfills with `value`.
    ///
    /// If `value` is itself a deferred value, its outcome is adopted.
    pub fn resolved(&self, value: impl Into<Value>) -> Deferred {
        self.deferred(|resolver| {
            resolver.resolve(value);
            Ok(())
        })
    }

    /// Creates a deferred value that rejects with `reason`.
    pub fn rejected(&self, reason: impl Into<Value>) -> Deferred {
        self.deferred(|resolver| {
            resolver.reject(reason);
            Ok(())
        })
    }

    /// Creates a pending deferred value together with its resolver.
    pub fn pair(&self) -> DeferredPair {
        DeferredPair::new_in(self)
    }

    /// Returns `true` if both handles point at the same scheduler.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.scheduler, &other.scheduler)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("scheduler", &Arc::as_ptr(&self.scheduler).cast::<()>())
            .finish()
    }
}
