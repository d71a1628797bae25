//! Monotonic modification stamps
//!
//! Stamps come from a process-wide counter rather than wall-clock time so
//! that two events can never be reordered by clock adjustments.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static CLOCK: AtomicU64 = AtomicU64::new(1);

/// A point on the scene graph's logical clock
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// Earlier than every stamp handed out by [`TimeStamp::now`]
    pub const ZERO: TimeStamp = TimeStamp(0);

    /// Next stamp; strictly greater than every previously returned one
    #[inline]
    pub fn now() -> Self {
        Self(CLOCK.fetch_add(1, Ordering::SeqCst))
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeStamp({})", self.0)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_strictly_increases() {
        let a = TimeStamp::now();
        let b = TimeStamp::now();
        assert!(b > a);
        assert!(a > TimeStamp::ZERO);
    }

    #[test]
    fn test_now_is_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..100).map(|_| TimeStamp::now()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<_> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        let count = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), count);
    }
}
