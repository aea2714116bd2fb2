use std::ops::Deref;

/// A session-owned handle that logs its release.
///
/// Session setup keeps each acquired object in a `Scoped` local, so an early return drops the
/// objects created so far in reverse order of acquisition, and a finished session releases
/// them in field order.
pub struct Scoped<T> {
    label: &'static str,
    value: T,
}

impl<T> Scoped<T> {
    pub fn new(label: &'static str, value: T) -> Self {
        log::debug!("acquired {label}");
        Self { label, value }
    }
}

impl<T> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Scoped<T> {
    fn drop(&mut self) {
        log::debug!("released {}", self.label);
        #[cfg(test)]
        journal::record(self.label);
    }
}

/// Per-thread record of `Scoped` releases, so tests can check the order real setup code
/// releases in.
#[cfg(test)]
pub(crate) mod journal {
    use std::cell::RefCell;

    thread_local! {
        static RELEASED: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }

    pub(super) fn record(label: &'static str) {
        RELEASED.with(|r| r.borrow_mut().push(label));
    }

    /// Returns and clears the labels released on this thread so far.
    pub(crate) fn take() -> Vec<&'static str> {
        RELEASED.with(|r| std::mem::take(&mut *r.borrow_mut()))
    }
}
