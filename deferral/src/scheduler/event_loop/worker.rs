use super::injector::Injector;
use crate::scheduler::Handle;
use crate::scheduler::context::enter_context;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// The thread that runs an event loop's jobs.
///
/// The loop is:
/// 1. Stop if shutdown was signalled
/// 2. Pop the oldest job and run it inside the scheduler context, a
///    panicking job is logged and the loop goes on
/// 3. Park if no job is available
pub(crate) struct Worker {
    /// Queue the worker drains.
    injector: Arc<Injector>,

    /// Handle installed as the current scheduler while a job runs.
    handle: Handle,
}

impl Worker {
    pub(crate) fn new(injector: Arc<Injector>, handle: Handle) -> Self {
        Self { injector, handle }
    }

    /// Runs the worker loop until shutdown.
    pub(crate) fn run(&self) {
        tracing::debug!("event loop worker started");

        loop {
            if self.injector.is_shutdown() {
                break;
            }

            if let Some(job) = self.injector.pop() {
                let handle = self.handle.clone();
                if panic::catch_unwind(AssertUnwindSafe(|| enter_context(handle, job))).is_err() {
                    tracing::error!("scheduled job panicked");
                }
                continue;
            }

            self.injector.park();
        }

        tracing::debug!("event loop worker stopped");
    }
}
