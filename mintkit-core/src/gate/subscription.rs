use std::future::Future;

use tokio::task::AbortHandle;

/// Owned handle on a background watcher task. Dropping it stops the watcher.
#[derive(Debug)]
pub(crate) struct Subscription {
    handle: Option<AbortHandle>,
}

impl Subscription {
    /// Spawns `watcher` on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub(crate) fn spawn<F>(watcher: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(watcher).abort_handle();
        Self {
            handle: Some(handle),
        }
    }

    /// Releases the handle without stopping the task. The watcher calls this on itself
    /// when it is about to finish, so that work it has already started is not cut short.
    pub(crate) fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
