use super::EventLoop;
use crate::error::Result;

use std::time::Duration;

/// Builder for configuring and creating an [`EventLoop`].
///
/// # Examples
///
/// ```rust
/// use deferral::EventLoopBuilder;
/// use std::time::Duration;
///
/// let event_loop = EventLoopBuilder::new()
///     .thread_name("reactions")
///     .park_timeout(Duration::from_millis(5))
///     .build()
///     .expect("event loop");
/// # drop(event_loop);
/// ```
pub struct EventLoopBuilder {
    /// Name given to the worker thread.
    pub(crate) thread_name: String,

    /// Upper bound on a single park of the idle worker.
    pub(crate) park_timeout: Duration,
}

impl EventLoopBuilder {
    /// Creates a builder with the default configuration.
    ///
    /// The worker thread is named `deferral-worker` and parks for at most
    /// one millisecond at a time.
    pub fn new() -> Self {
        Self {
            thread_name: String::from("deferral-worker"),
            park_timeout: Duration::from_millis(1),
        }
    }

    /// Sets the name of the worker thread.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the upper bound on a single park of the idle worker.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero.
    pub fn park_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "park_timeout must be > 0");

        self.park_timeout = timeout;
        self
    }

    /// Builds the event loop and starts its worker thread.
    pub fn build(self) -> Result<EventLoop> {
        EventLoop::new(self)
    }
}

impl Default for EventLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
