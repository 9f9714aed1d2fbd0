use super::builder::EventLoopBuilder;
use super::injector::Injector;
use super::worker::Worker;
use crate::deferred::{Deferred, Outcome};
use crate::error::{Error, Result};
use crate::scheduler::Handle;

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A scheduler backed by a dedicated worker thread.
///
/// `EventLoop` is responsible for:
/// - owning the injector queue and the worker thread,
/// - handing out [`Handle`]s that schedule onto that queue,
/// - providing a synchronous entry point via [`block_on`](Self::block_on).
///
/// Dropping the loop signals shutdown and joins the worker. Jobs still
/// queued at that point never run.
pub struct EventLoop {
    /// Queue shared with the worker and all handles.
    injector: Arc<Injector>,

    /// Handle scheduling onto `injector`.
    handle: Handle,

    /// Join handle of the worker thread.
    worker: Option<JoinHandle<()>>,
}

impl EventLoop {
    /// Creates an event loop with the default configuration.
    pub fn new_default() -> Result<Self> {
        EventLoopBuilder::new().build()
    }

    pub(crate) fn new(builder: EventLoopBuilder) -> Result<Self> {
        let injector = Arc::new(Injector::new(builder.park_timeout));
        let handle = Handle::from_arc(injector.clone());

        let worker = Worker::new(injector.clone(), handle.clone());
        let join = thread::Builder::new()
            .name(builder.thread_name.clone())
            .spawn(move || worker.run())
            .map_err(|err| Error::Spawn(err.to_string()))?;

        tracing::debug!(thread = %builder.thread_name, "event loop started");

        Ok(Self {
            injector,
            handle,
            worker: Some(join),
        })
    }

    /// Returns a handle scheduling onto this loop.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Blocks the current thread until `deferred` settles.
    ///
    /// An already settled value returns its outcome right away, whatever
    /// scheduler it belongs to. A pending value settles through its own
    /// scheduler, so if that is a [`Trampoline`](crate::Trampoline) nobody
    /// ticks or a stopped loop, this waits forever; use
    /// [`block_on_timeout`](Self::block_on_timeout) there.
    ///
    /// Must not be called from a job running on this loop: the worker would
    /// wait on itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shutdown`] if the reactions observing a pending
    /// `deferred` are dropped without running, which happens when its
    /// scheduler shuts down while the settlement is queued.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deferral::{EventLoop, Outcome, Value};
    ///
    /// let event_loop = EventLoop::new_default().unwrap();
    /// let deferred = event_loop.handle().resolved("done");
    ///
    /// let outcome = event_loop.block_on(&deferred).unwrap();
    /// assert_eq!(outcome, Outcome::Fulfilled(Value::from("done")));
    /// ```
    pub fn block_on(&self, deferred: &Deferred) -> Result<Outcome> {
        if let Some(outcome) = deferred.outcome() {
            return Ok(outcome);
        }

        let receiver = Self::subscribe(deferred);

        receiver.recv().map_err(|_| Error::Shutdown)
    }

    /// Like [`block_on`](Self::block_on), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when `timeout` elapses first, and
    /// [`Error::Shutdown`] as [`block_on`](Self::block_on) does.
    pub fn block_on_timeout(&self, deferred: &Deferred, timeout: Duration) -> Result<Outcome> {
        if let Some(outcome) = deferred.outcome() {
            return Ok(outcome);
        }

        let receiver = Self::subscribe(deferred);

        receiver.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => Error::Timeout(timeout),
            RecvTimeoutError::Disconnected => Error::Shutdown,
        })
    }

    /// Registers reactions that forward the outcome of `deferred` through a
    /// channel.
    fn subscribe(deferred: &Deferred) -> mpsc::Receiver<Outcome> {
        let (transmitter, receiver) = mpsc::channel();
        let on_rejected = transmitter.clone();

        deferred.observe(
            Box::new(move |value| {
                let _ = transmitter.send(Outcome::Fulfilled(value));
            }),
            Box::new(move |reason| {
                let _ = on_rejected.send(Outcome::Rejected(reason));
            }),
        );

        receiver
    }
}

impl Drop for EventLoop {
    /// Shuts down the loop.
    ///
    /// 1. Signals shutdown and wakes the worker
    /// 2. Joins the worker thread
    fn drop(&mut self) {
        self.injector.shutdown();

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        tracing::debug!("event loop shut down");
    }
}
