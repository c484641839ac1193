//! Serialized execution primitives
//!
//! Two guards protect every mutating operation:
//! - [`SyncTaskQueue`] serializes operations in arrival order; a second
//!   operation waits behind the first.
//! - [`BusyLock`] is the coarse user-visible guard; it fails fast instead of
//!   queuing and releases on drop, so it is held across any outcome.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// FIFO serializer for mutating operations
///
/// At most one enqueued future runs at a time; tokio's mutex is fair, so
/// operations complete in the order they were enqueued.
#[derive(Debug, Default)]
pub struct SyncTaskQueue {
    lock: Mutex<()>,
}

impl SyncTaskQueue {
    /// Create an empty queue
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` after all previously enqueued operations complete
    pub async fn run<T, F>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        fut.await
    }
}

/// Coarse busy guard for user-triggered operations
///
/// Unlike the queue, a locked [`BusyLock`] rejects new acquisitions outright;
/// the guard releases on drop, which covers early returns and errors alike.
#[derive(Debug, Default)]
pub struct BusyLock {
    locked: AtomicBool,
}

impl BusyLock {
    /// Create an unlocked busy lock
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock; `None` when an operation is already in flight
    #[must_use]
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { lock: self })
    }

    /// Whether an operation currently holds the lock
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

/// RAII guard for [`BusyLock`]
#[derive(Debug)]
pub struct BusyGuard<'a> {
    lock: &'a BusyLock,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
