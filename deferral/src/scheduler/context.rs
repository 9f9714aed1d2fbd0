use super::Handle;

use std::cell::RefCell;

thread_local! {
    /// Thread-local handle to the current scheduler.
    ///
    /// This is set while a scheduler runs a job, or inside
    /// [`Handle::enter`], and lets [`Deferred::new`](crate::Deferred::new)
    /// find its scheduler without explicit parameter passing.
    static CURRENT_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Restores the previous handle when dropped, including on unwind.
struct Restore(Option<Handle>);

impl Drop for Restore {
    fn drop(&mut self) {
        let prev = self.0.take();
        CURRENT_HANDLE.with(|cell| {
            cell.replace(prev);
        });
    }
}

/// Enters the scheduler context for the current thread.
///
/// Installs `handle` as the current scheduler for the duration of `f`.
/// After the closure completes, the previous handle is restored.
pub(crate) fn enter_context<R>(handle: Handle, f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_HANDLE.with(|cell| cell.replace(Some(handle)));
    let _restore = Restore(prev);

    f()
}

/// Returns a clone of the current handle, if one is installed.
pub(crate) fn current() -> Option<Handle> {
    CURRENT_HANDLE.with(|cell| cell.borrow().clone())
}
