use crossbeam_utils::Backoff;

use super::{AtomicIsize, AtomicUsize, Ordering};

/// An atomic integer whose read-modify-write updates are built from an explicit
/// compare-and-swap retry loop.
pub trait AtomicCounter {
    type Elem: Copy;

    /// Loads the current value.
    ///
    /// `load` takes an `Ordering` argument which describes
    /// the memory ordering of this operation.
    /// Possible values are `SeqCst`, `Acquire` and `Relaxed`.
    ///
    /// # Panics
    ///
    /// Panics if `order` is `Release` or `AcqRel`.
    fn load(&self, order: Ordering) -> Self::Elem;

    /// Stores `new` if the current value is the same as `current`.
    ///
    /// This function is allowed to spuriously fail even when the comparison
    /// succeeds. The return value is a result indicating whether the new value
    /// was written and containing the previous value.
    ///
    /// `success` describes the required ordering for the read-modify-write
    /// operation that takes place if the comparison with `current` succeeds.
    /// `failure` describes the required ordering for the load operation that
    /// takes place when the comparison fails. The failure ordering can only be
    /// `SeqCst`, `Acquire` or `Relaxed`.
    fn compare_exchange_weak(
        &self,
        current: Self::Elem,
        new: Self::Elem,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Elem, Self::Elem>;

    /// Adds `delta` to `current`, wrapping on overflow.
    fn wrapping_offset(current: Self::Elem, delta: Self::Elem) -> Self::Elem;

    /// Applies `f` to the current value and tries to commit the result, retrying
    /// with the freshly observed value until one compare-and-swap succeeds.
    /// Returns the value that was written.
    ///
    /// `f` may run several times if other threads change the value in the
    /// meantime, but its result is committed exactly once. Failed attempts back
    /// off with a short spin before retrying.
    ///
    /// Note: This does not protect the program from the ABA problem, which is
    /// harmless for plain integers.
    fn cas_update<F>(&self, set_order: Ordering, fetch_order: Ordering, mut f: F) -> Self::Elem
    where
        F: FnMut(Self::Elem) -> Self::Elem,
    {
        let backoff = Backoff::new();
        let mut prev = self.load(fetch_order);
        loop {
            let next = f(prev);
            match self.compare_exchange_weak(prev, next, set_order, fetch_order) {
                Ok(_) => return next,
                Err(actual) => {
                    prev = actual;
                    backoff.spin();
                }
            }
        }
    }

    /// Adds `delta` through [`cas_update`](AtomicCounter::cas_update) and returns
    /// the new value.
    fn cas_add(&self, delta: Self::Elem) -> Self::Elem {
        self.cas_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            Self::wrapping_offset(current, delta)
        })
    }
}

macro_rules! impl_atomic_counter {
    ($($atomic:ty => $elem:ty),* $(,)?) => {
        $(
            impl AtomicCounter for $atomic {
                type Elem = $elem;

                #[inline]
                fn load(&self, order: Ordering) -> $elem {
                    <$atomic>::load(self, order)
                }

                #[inline]
                fn compare_exchange_weak(
                    &self,
                    current: $elem,
                    new: $elem,
                    success: Ordering,
                    failure: Ordering,
                ) -> Result<$elem, $elem> {
                    <$atomic>::compare_exchange_weak(self, current, new, success, failure)
                }

                #[inline]
                fn wrapping_offset(current: $elem, delta: $elem) -> $elem {
                    current.wrapping_add(delta)
                }
            }
        )*
    };
}

impl_atomic_counter!(AtomicUsize => usize, AtomicIsize => isize);
