//! Snapshot State Container
//!
//! Shared mutable state (selection, unit board) lives in a [`StateCell`]:
//! readers take immutable `Arc` snapshots, writers derive the next snapshot
//! from the *latest* value with a pure function. The derivation runs under
//! the cell's write lock, so two interleaved async continuations can never
//! overwrite each other from stale captures.

use std::sync::Arc;

use tokio::sync::watch;

/// Single-owner state cell with snapshot reads and observable updates
pub struct StateCell<T> {
    sender: watch::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.sender.borrow())
    }

    /// Derive the next snapshot from the latest one.
    ///
    /// Returns the snapshot that was installed.
    pub fn update<F>(&self, derive: F) -> Arc<T>
    where
        F: FnOnce(&T) -> T,
    {
        let mut installed = None;
        self.sender.send_modify(|current| {
            let next = Arc::new(derive(&**current));
            installed = Some(Arc::clone(&next));
            *current = next;
        });
        installed.unwrap_or_else(|| self.snapshot())
    }

    /// Replace the state wholesale
    pub fn replace(&self, value: T) -> Arc<T> {
        let next = Arc::new(value);
        self.sender.send_replace(Arc::clone(&next));
        next
    }

    /// Observe snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.sender.subscribe()
    }
}

impl<T: Default + Send + Sync + 'static> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for StateCell<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StateCell").field(&*self.sender.borrow()).finish()
    }
}
