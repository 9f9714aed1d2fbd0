use super::resolver::Resolver;
use super::state::{Outcome, State};
use crate::error::Error;
use crate::scheduler::Handle;
use crate::value::Value;

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::Waker;

/// Source of process-unique ids, used in `Debug` output and log records.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A queued reaction, called with the outcome value once settled.
pub(crate) type Reaction = Box<dyn FnOnce(Value) + Send + 'static>;

thread_local! {
    /// Reactions waiting to be dropped by the release loop running on this
    /// thread, if any.
    static RELEASING: RefCell<Option<Vec<Reaction>>> = const { RefCell::new(None) };
}

/// State slot of a deferred value.
///
/// While pending it owns the two reaction queues and the async waiters.
/// The transition replaces the whole slot, which drains the queues exactly
/// once.
pub(super) enum Slot {
    Pending {
        on_fulfilled: Vec<Reaction>,
        on_rejected: Vec<Reaction>,
        waiters: Vec<Waker>,
    },
    Fulfilled(Value),
    Rejected(Value),
}

impl Slot {
    fn state(&self) -> State {
        match self {
            Slot::Pending { .. } => State::Pending,
            Slot::Fulfilled(_) => State::Fulfilled,
            Slot::Rejected(_) => State::Rejected,
        }
    }
}

struct Shared {
    id: u64,

    /// Scheduler every reaction and transition goes through.
    handle: Handle,

    /// Guarded so that the pending check and the enqueue in `observe`, and
    /// the transition and the drain, are each one critical section.
    slot: Mutex<Slot>,

    /// Set by the first public `resolve`/`reject`.
    claimed: AtomicBool,
}

impl Drop for Shared {
    /// Releases the reactions of a value that never settled.
    ///
    /// Each reaction owns the value it would settle, so a pending chain is a
    /// linked list of `Shared`s. They are released through [`release`]
    /// instead of recursively.
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        let Slot::Pending {
            on_fulfilled,
            on_rejected,
            ..
        } = slot
        else {
            return;
        };

        let mut reactions = mem::take(on_fulfilled);
        reactions.append(on_rejected);

        if !reactions.is_empty() {
            release(reactions);
        }
    }
}

/// Drops `reactions` iteratively.
///
/// The outermost call on a thread runs the loop. Values released while it
/// runs hand their reactions to it and return, so the stack depth stays
/// constant however long the chain is.
fn release(reactions: Vec<Reaction>) {
    let mut reactions = Some(reactions);

    let outermost = RELEASING
        .try_with(|cell| {
            let mut queue = cell.borrow_mut();
            match queue.as_mut() {
                Some(pending) => {
                    pending.extend(reactions.take().into_iter().flatten());
                    false
                }
                None => {
                    *queue = reactions.take();
                    true
                }
            }
        })
        // Thread-local storage is gone during thread exit; `reactions` is
        // then dropped recursively on return.
        .unwrap_or(false);

    if !outermost {
        return;
    }

    loop {
        let next = RELEASING.with(|cell| cell.borrow_mut().as_mut().and_then(Vec::pop));
        match next {
            // Dropped outside the borrow, it may release more values.
            Some(reaction) => drop(reaction),
            None => break,
        }
    }

    RELEASING.with(|cell| cell.borrow_mut().take());
}

/// A value that becomes available later.
///
/// Cloning a `Deferred` is cheap and yields another reference to the same
/// value.
///
/// # Examples
///
/// ```rust
/// use deferral::{Deferred, Trampoline, Value};
///
/// let trampoline = Trampoline::new();
/// let chained = trampoline.handle().enter(|| {
///     Deferred::new(|resolver| {
///         resolver.resolve(1);
///         Ok(())
///     })
///     .and_then(|v| Ok(Value::from(v.as_number().unwrap_or_default() + 1.0)))
///     .and_then(|v| Ok(Value::from(v.as_number().unwrap_or_default() * 2.0)))
/// });
///
/// trampoline.run_until_idle();
/// assert_eq!(chained.outcome().map(|o| o.into_result()), Some(Ok(Value::from(4))));
/// ```
#[derive(Clone)]
pub struct Deferred {
    shared: Arc<Shared>,
}

impl Deferred {
    /// Creates a deferred value on the current scheduler and runs
    /// `executor` synchronously with its resolver.
    ///
    /// An `Err` returned by `executor`, or a panic inside it, rejects the
    /// value unless the executor already settled it.
    ///
    /// # Panics
    ///
    /// Panics if no scheduler is in context; see [`Handle::current`].
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver) -> Result<(), Value>,
    {
        Self::new_in(&Handle::current(), executor)
    }

    pub(crate) fn new_in<F>(handle: &Handle, executor: F) -> Self
    where
        F: FnOnce(Resolver) -> Result<(), Value>,
    {
        let deferred = Self::pending(handle.clone());
        let resolver = Resolver::new(deferred.clone());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| executor(resolver.clone())));
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(reason)) => Some(reason),
            Err(payload) => Some(panic_reason(payload)),
        };

        if let Some(reason) = failure {
            tracing::trace!(deferred = deferred.id(), "executor failed");
            resolver.reject(reason);
        }

        deferred
    }

    /// A pending value with no executor.
    pub(crate) fn pending(handle: Handle) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(deferred = id, "deferred created");

        Self {
            shared: Arc::new(Shared {
                id,
                handle,
                slot: Mutex::new(Slot::Pending {
                    on_fulfilled: Vec::new(),
                    on_rejected: Vec::new(),
                    waiters: Vec::new(),
                }),
                claimed: AtomicBool::new(false),
            }),
        }
    }

    /// Process-unique id, shown in `Debug` output and log records.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// The scheduler this value runs its reactions on.
    pub fn handle(&self) -> &Handle {
        &self.shared.handle
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.lock().state()
    }

    /// Returns `true` until the value settles.
    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    /// The settled outcome, or `None` while pending.
    pub fn outcome(&self) -> Option<Outcome> {
        match &*self.lock() {
            Slot::Pending { .. } => None,
            Slot::Fulfilled(value) => Some(Outcome::Fulfilled(value.clone())),
            Slot::Rejected(reason) => Some(Outcome::Rejected(reason.clone())),
        }
    }

    /// Returns `true` if both are references to the same value.
    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, Slot> {
        // User code never runs under this lock, so a poisoned slot is intact.
        self.shared
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the public settle capability. Only the first call wins.
    pub(super) fn claim(&self) -> bool {
        !self.shared.claimed.swap(true, Ordering::AcqRel)
    }

    /// Registers a pair of reactions.
    ///
    /// While pending they are queued. Once settled, the matching one is
    /// scheduled right away. Either way it never runs before this returns.
    pub(crate) fn observe(&self, on_fulfilled: Reaction, on_rejected: Reaction) {
        let mut slot = self.lock();

        let (reaction, value) = match &mut *slot {
            Slot::Pending {
                on_fulfilled: fulfilled,
                on_rejected: rejected,
                ..
            } => {
                fulfilled.push(on_fulfilled);
                rejected.push(on_rejected);
                return;
            }
            Slot::Fulfilled(value) => (on_fulfilled, value.clone()),
            Slot::Rejected(reason) => (on_rejected, reason.clone()),
        };
        drop(slot);

        self.shared.handle.schedule(move || reaction(value));
    }

    /// Settles with a success value.
    ///
    /// A deferred value is adopted rather than stored: this value settles
    /// however `value` eventually settles. Adopting itself would never
    /// settle, so that case rejects with a type error instead.
    pub(super) fn settle_success(&self, value: Value) {
        if let Value::Deferred(source) = &value {
            if source.ptr_eq(self) {
                tracing::trace!(deferred = self.id(), "resolved with itself");
                self.schedule_transition(Outcome::Rejected(Value::Error(Error::Type(format!(
                    "deferred #{} resolved with itself",
                    self.id()
                )))));
                return;
            }

            tracing::trace!(
                deferred = self.id(),
                source = source.id(),
                "adopting outcome"
            );

            let on_fulfilled = self.clone();
            let on_rejected = self.clone();
            source.observe(
                Box::new(move |value| on_fulfilled.settle_success(value)),
                Box::new(move |reason| on_rejected.settle_failure(reason)),
            );
            return;
        }

        self.schedule_transition(Outcome::Fulfilled(value));
    }

    /// Settles with a failure reason.
    ///
    /// The reason is stored as is, deferred values included. Rejecting with
    /// itself would make the value own itself and never be freed, so that
    /// case rejects with a type error instead.
    pub(super) fn settle_failure(&self, reason: Value) {
        if let Value::Deferred(source) = &reason {
            if source.ptr_eq(self) {
                tracing::trace!(deferred = self.id(), "rejected with itself");
                self.schedule_transition(Outcome::Rejected(Value::Error(Error::Type(format!(
                    "deferred #{} rejected with itself",
                    self.id()
                )))));
                return;
            }
        }

        self.schedule_transition(Outcome::Rejected(reason));
    }

    fn schedule_transition(&self, outcome: Outcome) {
        if !self.is_pending() {
            return;
        }

        let this = self.clone();
        self.shared
            .handle
            .schedule(move || this.transition(outcome));
    }

    /// Moves from pending to `outcome` and hands the matching reactions to
    /// the scheduler in registration order.
    ///
    /// A no-op if another transition already happened.
    fn transition(&self, outcome: Outcome) {
        let mut slot = self.lock();
        if !matches!(*slot, Slot::Pending { .. }) {
            tracing::trace!(deferred = self.id(), "already settled, transition ignored");
            return;
        }

        let settled = match &outcome {
            Outcome::Fulfilled(value) => Slot::Fulfilled(value.clone()),
            Outcome::Rejected(reason) => Slot::Rejected(reason.clone()),
        };
        let previous = mem::replace(&mut *slot, settled);
        drop(slot);

        let Slot::Pending {
            on_fulfilled,
            on_rejected,
            waiters,
        } = previous
        else {
            return;
        };

        let (reactions, value) = match outcome {
            Outcome::Fulfilled(value) => (on_fulfilled, value),
            Outcome::Rejected(reason) => (on_rejected, reason),
        };

        tracing::trace!(
            deferred = self.id(),
            state = ?self.state(),
            kind = value.kind(),
            reactions = reactions.len(),
            "settled"
        );

        for reaction in reactions {
            let value = value.clone();
            self.shared.handle.schedule(move || reaction(value));
        }

        for waiter in waiters {
            waiter.wake();
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `try_lock` so that formatting never waits on, or deadlocks with,
        // a settlement in progress.
        let state = match self.shared.slot.try_lock() {
            Ok(slot) => Some(slot.state()),
            Err(_) => None,
        };

        f.debug_struct("Deferred")
            .field("id", &self.shared.id)
            .field("state", &state)
            .finish()
    }
}

/// Converts a panic payload into a rejection reason.
pub(super) fn panic_reason(payload: Box<dyn Any + Send>) -> Value {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("panic with a non-string payload")
    };

    Value::Error(Error::raised(message))
}
