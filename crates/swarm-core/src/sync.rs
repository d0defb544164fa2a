//! Lock acquisition for shared arena state.
//!
//! A poisoned lock means another thread panicked mid-mutation, which in this
//! crate family only happens on an invariant violation.  The state behind
//! the lock is then untrustworthy, so acquiring it is itself fatal.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::invariant_failed;

/// Shared access to `lock`; `what` names it in the diagnostic.
pub fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    lock.read()
        .unwrap_or_else(|_| invariant_failed!("{what} lock poisoned"))
}

/// Exclusive access to `lock`.
pub fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    lock.write()
        .unwrap_or_else(|_| invariant_failed!("{what} lock poisoned"))
}

pub fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex
        .lock()
        .unwrap_or_else(|_| invariant_failed!("{what} mutex poisoned"))
}
