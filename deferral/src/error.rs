use std::time::Duration;

/// Errors produced by the engine and its schedulers.
///
/// The engine itself never returns these from a settle procedure; they are
/// carried as rejection reasons inside [`Value::Error`](crate::Value::Error)
/// or returned by host-facing waiting APIs such as
/// [`EventLoop::block_on`](crate::EventLoop::block_on).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A value was used where its type makes no sense, e.g. a deferred value
    /// resolved with itself.
    #[error("TypeError: {0}")]
    Type(String),

    /// A user-level error raised by an executor, a handler, or a thenable.
    #[error("{0}")]
    Raised(String),

    /// The event loop stopped before the awaited value settled.
    #[error("event loop shut down before the deferred value settled")]
    Shutdown,

    /// The event loop worker thread could not be started.
    #[error("failed to start event loop worker: {0}")]
    Spawn(String),

    /// Waiting for a deferred value took longer than the given bound.
    #[error("deferred value did not settle within {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Builds a [`Error::Raised`] from anything printable.
    pub fn raised(message: impl Into<String>) -> Self {
        Error::Raised(message.into())
    }

    /// Returns `true` for the type-mismatch family of errors.
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::Type(_))
    }
}

/// Result alias used by host-facing APIs.
pub type Result<T> = std::result::Result<T, Error>;
