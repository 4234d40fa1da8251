//! Concurrency guard
//!
//! One readers-writer lock over the whole keyspace. Every store operation
//! runs inside exactly one section; a read-modify-write cycle is a single
//! write section so concurrent writers cannot lose each other's updates.
//!
//! Guards are RAII, so the lock is released on every exit path, including
//! a panic unwinding out of the closure. parking_lot locks do not poison,
//! so the store stays usable after such a panic.

use parking_lot::{RwLock, RwLockReadGuard};

/// Process-wide readers-writer lock for a store
#[derive(Debug, Default)]
pub struct StoreLock {
    lock: RwLock<()>,
}

impl StoreLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` in shared mode; any number of readers may proceed together
    ///
    /// Shared sections nest: a thread already holding one (say, through a
    /// live listing) can enter another even while a writer is queued.
    pub fn with_read<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.lock.read_recursive();
        f()
    }

    /// Run `f` in exclusive mode; excludes all readers and other writers
    pub fn with_write<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.lock.write();
        f()
    }

    /// Shared guard for sections that outlive a single closure (listing)
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read_recursive()
    }

    /// True while a writer holds the lock
    pub fn is_write_locked(&self) -> bool {
        self.lock.is_locked_exclusive()
    }
}
