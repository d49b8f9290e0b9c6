//! Mutex shim selected by the `parking-lot` feature.

#[cfg(feature = "parking-lot")]
pub(crate) type LockGuard<'a, T> = parking_lot::MutexGuard<'a, T>;
#[cfg(not(feature = "parking-lot"))]
pub(crate) type LockGuard<'a, T> = std::sync::MutexGuard<'a, T>;

#[cfg(feature = "parking-lot")]
type RawMutex<T> = parking_lot::Mutex<T>;
#[cfg(not(feature = "parking-lot"))]
type RawMutex<T> = std::sync::Mutex<T>;

/// Never hold a guard across a factory call.
#[derive(Default)]
pub(crate) struct Lock<T> {
    inner: RawMutex<T>,
}

impl<T> Lock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: RawMutex::new(value),
        }
    }

    #[cfg(feature = "parking-lot")]
    #[inline]
    pub(crate) fn lock(&self) -> LockGuard<'_, T> {
        self.inner.lock()
    }

    #[cfg(not(feature = "parking-lot"))]
    #[inline]
    pub(crate) fn lock(&self) -> LockGuard<'_, T> {
        // Factories run outside the lock, so a poisoned state is still consistent.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
