//! Shared-resource locks for the periodic tasks.
//!
//! Every task runs on its own thread and blocks on these primitives via
//! `futures_lite::future::block_on`, the same way the control loop waits
//! on the `embassy-sync` channels.
//!
//! ```text
//!  health ─┐                  ┌─▶ BusLock   (sensor port + health snapshot)
//!  telem  ─┼── lock ▶ release ┤
//!  model  ─┘                  └─▶ RadioLock (mesh transport)
//! ```
//!
//! No task holds both locks at once.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};

/// Exclusive lock over a shared resource.
pub type Lock<T> = Mutex<CriticalSectionRawMutex, T>;

/// Guard returned by [`lock_blocking`].
pub type Guard<'a, T> = MutexGuard<'a, CriticalSectionRawMutex, T>;

/// A lock shared between tasks.
pub type Shared<T> = Arc<Lock<T>>;

/// Wrap `value` in a lock that tasks can share.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Acquire `lock` from a blocking context, parking the thread until the
/// current holder releases it.
pub fn lock_blocking<T>(lock: &Lock<T>) -> Guard<'_, T> {
    futures_lite::future::block_on(lock.lock())
}
