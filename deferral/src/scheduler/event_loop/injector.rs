use crate::scheduler::{Job, Schedule};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Global job queue of an event loop.
///
/// Handles push jobs here from any thread. The worker pops them in FIFO
/// order and parks on the condition variable when the queue is empty.
pub(crate) struct Injector {
    /// Queue holding submitted jobs.
    queue: Mutex<VecDeque<Job>>,

    /// Condition variable used to wake the parked worker.
    condvar: Condvar,

    /// Indicates whether the loop is shutting down.
    shutdown: AtomicBool,

    /// Upper bound on a single park.
    park_timeout: Duration,
}

impl Injector {
    /// Creates a new empty injector.
    pub(crate) fn new(park_timeout: Duration) -> Self {
        Injector {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
            park_timeout,
        }
    }

    /// Signals shutdown and wakes the parked worker.
    ///
    /// Jobs still queued are dropped here. The flag is set under the queue
    /// lock, so no job can be pushed after the drain.
    pub(crate) fn shutdown(&self) {
        let dropped = {
            let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            self.shutdown.store(true, Ordering::Release);
            std::mem::take(&mut *queue)
        };
        self.condvar.notify_all();

        if !dropped.is_empty() {
            tracing::debug!(jobs = dropped.len(), "dropping queued jobs at shutdown");
        }
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Pops the oldest job, if any.
    pub(crate) fn pop(&self) -> Option<Job> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Parks the worker until a job arrives, shutdown is signalled, or the
    /// park timeout elapses.
    pub(crate) fn park(&self) {
        let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_shutdown() || !queue.is_empty() {
            return;
        }

        let _ = self
            .condvar
            .wait_timeout(queue, self.park_timeout)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

impl Schedule for Injector {
    /// Pushes a job and wakes the worker.
    ///
    /// Jobs submitted after shutdown are dropped.
    fn schedule(&self, job: Job) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);

        if self.is_shutdown() {
            drop(queue);
            tracing::warn!("event loop is shut down, dropping scheduled job");
            return;
        }

        queue.push_back(job);
        drop(queue);
        self.condvar.notify_one();
    }
}
