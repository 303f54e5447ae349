use core::time::Duration;
use portable_atomic::{AtomicU64, Ordering};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of millisecond timestamps relative to some epoch.
///
/// This abstraction lets the generator run against the real wall clock or a
/// controlled clock in tests.
///
/// # Example
///
/// ```
/// use snowmint::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Wall-clock time source: UTC milliseconds elapsed since a fixed epoch.
///
/// Every reading queries [`SystemTime::now`], so NTP corrections and other
/// adjustments are visible to the generator, including backward jumps. The
/// generator detects and absorbs those (see
/// [`GeneratorConfig::max_clock_regression`]).
///
/// A reading taken while the system clock is earlier than the epoch is
/// reported as `0`.
///
/// [`GeneratorConfig::max_clock_regression`]: crate::GeneratorConfig::max_clock_regression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// A wall clock anchored at [`TWITTER_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(TWITTER_EPOCH)
    }
}

impl SystemClock {
    /// Creates a wall clock whose zero point is `epoch`, given as a
    /// [`Duration`] since 1970-01-01 UTC.
    #[must_use]
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    /// The epoch this clock measures from.
    #[must_use]
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let since_epoch = since_unix.saturating_sub(self.epoch).as_millis();
        u64::try_from(since_epoch).unwrap_or(u64::MAX)
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying reading, so a test can hand one clone to
/// a generator and drive time through another, including freezing it or
/// moving it backward.
///
/// # Example
///
/// ```
/// use snowmint::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new(100);
/// let handle = clock.clone();
///
/// handle.advance(5);
/// assert_eq!(clock.current_millis(), 105);
///
/// handle.set(90);
/// assert_eq!(clock.current_millis(), 90);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock frozen at `millis`.
    #[must_use]
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Moves the clock to `millis`, forward or backward.
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::Release);
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::AcqRel);
    }
}

impl TimeSource for ManualClock {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_counts_from_epoch() {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        let clock = SystemClock::with_epoch(TWITTER_EPOCH);
        let ts = clock.current_millis();
        let expected = unix_ms - TWITTER_EPOCH.as_millis() as u64;

        // Allow for the two readings straddling a few milliseconds.
        assert!(ts >= expected && ts < expected + 1_000);
        assert_eq!(SystemClock::default().epoch(), TWITTER_EPOCH);
    }

    #[test]
    fn system_clock_before_epoch_reads_zero() {
        let far_future = Duration::from_millis(u64::MAX / 2);
        assert_eq!(SystemClock::with_epoch(far_future).current_millis(), 0);
    }

    #[test]
    fn manual_clock_clones_share_reading() {
        let clock = ManualClock::new(10);
        let other = clock.clone();
        other.advance(3);
        assert_eq!(clock.current_millis(), 13);
        clock.set(1);
        assert_eq!(other.current_millis(), 1);
    }

    #[test]
    fn references_and_arcs_are_time_sources() {
        let clock = ManualClock::new(77);
        assert_eq!((&clock).current_millis(), 77);
        assert_eq!(Arc::new(clock).current_millis(), 77);
    }
}
