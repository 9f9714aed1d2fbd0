use super::context::enter_context;
use super::{Handle, Job, Schedule};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// FIFO job queue shared between a [`Trampoline`] and its handles.
struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl JobQueue {
    fn pop(&self) -> Option<Job> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Schedule for JobQueue {
    /// Jobs are pushed to the back of the queue and never run here.
    fn schedule(&self, job: Job) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(job);
    }
}

/// A manually driven scheduler.
///
/// Jobs accumulate until the owner calls [`tick`](Self::tick) or
/// [`run_until_idle`](Self::run_until_idle). Nothing runs in the background,
/// so every interleaving is deterministic and observable, which makes this
/// the scheduler of choice for tests.
///
/// # Examples
///
/// ```rust
/// use deferral::{Trampoline, Value};
///
/// let trampoline = Trampoline::new();
/// let value = trampoline.handle().resolved(41).and_then(|v| {
///     Ok(Value::from(v.as_number().unwrap_or_default() + 1.0))
/// });
///
/// assert!(value.is_pending());
/// trampoline.run_until_idle();
/// assert_eq!(value.outcome().map(|o| o.into_result()), Some(Ok(Value::from(42))));
/// ```
pub struct Trampoline {
    queue: Arc<JobQueue>,
    handle: Handle,
}

impl Trampoline {
    /// Creates an empty trampoline.
    pub fn new() -> Self {
        let queue = Arc::new(JobQueue {
            jobs: Mutex::new(VecDeque::new()),
        });
        let handle = Handle::from_arc(queue.clone());

        Self { queue, handle }
    }

    /// Returns a handle scheduling onto this trampoline.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Number of jobs waiting to run.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no job is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the oldest queued job.
    ///
    /// Returns `false` if the queue was empty.
    pub fn tick(&self) -> bool {
        // The lock is released before the job runs, jobs schedule more jobs.
        let Some(job) = self.queue.pop() else {
            return false;
        };

        enter_context(self.handle.clone(), job);
        true
    }

    /// Runs jobs until the queue is empty, including jobs scheduled by the
    /// jobs being run.
    ///
    /// Returns the number of jobs that ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.tick() {
            ran += 1;
        }

        tracing::trace!(jobs = ran, "trampoline idle");
        ran
    }
}

impl Default for Trampoline {
    fn default() -> Self {
        Self::new()
    }
}
