//! The pool-wide concurrency guard.
//!
//! Every public operation except `init` acquires a single pool-wide lock on
//! entry and releases it on every exit path. The `thread-safe` cargo
//! feature (default on) selects between `parking_lot::Mutex` and a bare
//! `RefCell` for a single-threaded build where the guard costs nothing.

#[cfg(feature = "thread-safe")]
use parking_lot::Mutex;

#[cfg(not(feature = "thread-safe"))]
use std::cell::RefCell;

/// Coarse-grained guard around the pool's mutable state.
///
/// `with` models "acquire on entry, release on every exit path": the
/// closure runs under the lock and its return value, including an `Err`,
/// propagates out after the lock is released.
pub struct Guard<T> {
    #[cfg(feature = "thread-safe")]
    inner: Mutex<T>,
    #[cfg(not(feature = "thread-safe"))]
    inner: RefCell<T>,
}

impl<T> Guard<T> {
    pub fn new(value: T) -> Self {
        Self {
            #[cfg(feature = "thread-safe")]
            inner: Mutex::new(value),
            #[cfg(not(feature = "thread-safe"))]
            inner: RefCell::new(value),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        #[cfg(feature = "thread-safe")]
        {
            let mut guard = self.inner.lock();
            f(&mut guard)
        }
        #[cfg(not(feature = "thread-safe"))]
        {
            let mut guard = self.inner.borrow_mut();
            f(&mut guard)
        }
    }

    /// Consumes the guard, returning the protected value.
    pub fn into_inner(self) -> T {
        #[cfg(feature = "thread-safe")]
        {
            self.inner.into_inner()
        }
        #[cfg(not(feature = "thread-safe"))]
        {
            self.inner.into_inner()
        }
    }
}
