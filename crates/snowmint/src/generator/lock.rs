use core::{fmt, marker::PhantomData, time::Duration};
use std::time::Instant;

#[cfg(feature = "parking-lot")]
use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
use std::sync::{Mutex, MutexGuard};
#[cfg(feature = "tracing")]
use tracing::instrument;

use super::state::{State, Step};
use crate::{
    Error, GeneratorConfig, Poll, Result,
    id::{Snowflake, SnowflakeTwitterId},
    time::{SystemClock, TimeSource},
};

/// A lock-based Snowflake ID generator, safe to share across threads.
///
/// All mutable state (last timestamp and sequence) sits behind a single
/// mutex. [`next_id`] holds that mutex for the whole call, waits included, so
/// concurrent callers are served one at a time and every ID is strictly
/// greater than every ID issued before it by the same generator.
///
/// The node id is fixed at construction and never changes.
///
/// ## Features
/// - ✅ Thread-safe (`Send + Sync` whenever the time source is)
/// - ✅ Any [`Snowflake`] layout
/// - ✅ Bounded handling of backward clock jumps
///
/// # Example
///
/// ```
/// use snowmint::IdGenerator;
///
/// let generator = IdGenerator::new(7).unwrap();
///
/// let a = generator.next_id().unwrap();
/// let b = generator.next_id().unwrap();
/// assert!(a < b);
/// assert_eq!(a.node_id(), 7);
///
/// let raw: u64 = b.into();
/// assert_eq!(raw, b.to_raw());
/// ```
///
/// [`next_id`]: IdGenerator::next_id
pub struct IdGenerator<ID = SnowflakeTwitterId, T = SystemClock>
where
    ID: Snowflake,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    config: GeneratorConfig,
    time: T,
    _id: PhantomData<fn() -> ID>,
}

impl IdGenerator {
    /// Creates a generator for `node_id` using the Twitter layout, the
    /// system wall clock at [`TWITTER_EPOCH`] and default tolerances.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdOutOfRange`] if `node_id` does not fit in 10
    /// bits.
    ///
    /// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
    pub fn new(node_id: u64) -> Result<Self> {
        Self::with_clock(node_id, SystemClock::default())
    }
}

impl<ID, T> IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    /// Creates a generator for `node_id` that reads time from `time`, with
    /// default tolerances.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdOutOfRange`] if `node_id` does not fit the
    /// layout's node field.
    ///
    /// # Example
    ///
    /// ```
    /// use snowmint::{IdGenerator, ManualClock, SnowflakeDiscordId};
    ///
    /// let clock = ManualClock::new(1_000);
    /// let generator = IdGenerator::<SnowflakeDiscordId, _>::with_clock(3, clock).unwrap();
    /// let id = generator.next_id().unwrap();
    /// assert_eq!((id.timestamp(), id.node_id(), id.sequence()), (1_000, 3, 0));
    /// ```
    pub fn with_clock(node_id: u64, time: T) -> Result<Self> {
        Self::with_config(GeneratorConfig::new(node_id), time)
    }

    /// Creates a generator from a full [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdOutOfRange`] or [`Error::InvalidConfig`] if
    /// [`GeneratorConfig::validate`] rejects the configuration.
    pub fn with_config(config: GeneratorConfig, time: T) -> Result<Self> {
        config.validate::<ID>()?;
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(State::new())),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(State::new()),
            config,
            time,
            _id: PhantomData,
        })
    }

    /// The node id encoded into every ID from this generator.
    pub const fn node_id(&self) -> u64 {
        self.config.node_id
    }

    /// The validated configuration this generator was built with.
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The clock this generator reads.
    ///
    /// # Example
    ///
    /// ```
    /// use snowmint::{IdGenerator, ManualClock, SnowflakeTwitterId, TimeSource};
    ///
    /// let generator =
    ///     IdGenerator::<SnowflakeTwitterId, _>::with_clock(1, ManualClock::new(10)).unwrap();
    /// generator.time_source().advance(5);
    /// assert_eq!(generator.time_source().current_millis(), 15);
    /// assert_eq!(generator.next_id().unwrap().timestamp(), 15);
    /// ```
    pub const fn time_source(&self) -> &T {
        &self.time
    }

    /// Mints the next ID, waiting if necessary.
    ///
    /// The generator's lock is held for the entire call. If the current
    /// millisecond's sequence is used up, the call waits for the clock to
    /// reach the next millisecond. If the clock reads earlier than the last
    /// issued timestamp, the call waits for it to catch up, within the
    /// configured [`max_clock_regression`]. Waiting re-reads the clock every
    /// [`backoff`].
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock moved backward beyond the
    ///   configured tolerance. The generator's state is left untouched, so a
    ///   later call can still succeed once the clock recovers.
    /// - [`Error::TimestampOverflow`] if the clock no longer fits the
    ///   layout's timestamp field.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (never with the `parking-lot` feature).
    ///
    /// [`max_clock_regression`]: GeneratorConfig::max_clock_regression
    /// [`backoff`]: GeneratorConfig::backoff
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<ID> {
        let mut state = self.lock()?;
        let mut behind_since = None;
        let mut waited = false;

        loop {
            match self.attempt(&mut state, &mut behind_since)? {
                Poll::Ready { id } => return Ok(id),
                Poll::Pending {
                    yield_for: _yield_for,
                } => {
                    if !waited {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            yield_for = _yield_for,
                            node_id = self.node_id(),
                            "waiting on clock"
                        );
                        waited = true;
                    }
                    std::thread::sleep(self.config.backoff);
                }
            }
        }
    }

    /// Attempts to mint an ID without waiting.
    ///
    /// Runs the same decision as [`next_id`] once. State changes only when an
    /// ID is returned.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: a new ID was minted
    /// - `Ok(Poll::Pending { yield_for })`: retry in about `yield_for`
    ///   milliseconds; `1` for an exhausted sequence, otherwise how far the
    ///   clock is behind
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock is already further behind
    ///   than the configured tolerance.
    /// - [`Error::TimestampOverflow`] and [`Error::LockPoisoned`] as for
    ///   [`next_id`].
    ///
    /// # Example
    /// ```
    /// use snowmint::{IdGenerator, Poll};
    ///
    /// let generator = IdGenerator::new(0).unwrap();
    ///
    /// let id = loop {
    ///     match generator.poll_id().unwrap() {
    ///         Poll::Ready { id } => break id,
    ///         Poll::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.node_id(), 0);
    /// ```
    ///
    /// [`next_id`]: IdGenerator::next_id
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_id(&self) -> Result<Poll<ID>> {
        self.poll_with(&mut None)
    }

    /// [`Self::poll_id`] for callers that retry across several attempts and
    /// need the regression tolerance applied to the total time spent behind.
    pub(crate) fn poll_with(&self, behind_since: &mut Option<Instant>) -> Result<Poll<ID>> {
        let mut state = self.lock()?;
        self.attempt(&mut state, behind_since)
    }

    fn attempt(&self, state: &mut State, behind_since: &mut Option<Instant>) -> Result<Poll<ID>> {
        let now = self.time.current_millis();
        match state.step(now, ID::max_sequence()) {
            Step::Mint {
                timestamp,
                sequence,
            } => {
                let max = ID::max_timestamp();
                if timestamp > max {
                    return Err(Error::TimestampOverflow { timestamp, max });
                }
                state.commit(timestamp, sequence);
                Ok(Poll::Ready {
                    id: ID::from_components(timestamp, self.node_id(), sequence),
                })
            }
            Step::Exhausted => Ok(Poll::Pending { yield_for: 1 }),
            Step::Behind { last_timestamp } => {
                Self::cold_clock_behind(&self.config, last_timestamp, now, behind_since)
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(
        config: &GeneratorConfig,
        last_timestamp: u64,
        now: u64,
        behind_since: &mut Option<Instant>,
    ) -> Result<Poll<ID>> {
        let behind = last_timestamp - now;
        let started = match behind_since {
            Some(started) => *started,
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    last_timestamp,
                    now,
                    behind_ms = behind,
                    "clock moved backward"
                );
                *behind_since.insert(Instant::now())
            }
        };

        if let Some(limit) = config.max_clock_regression {
            let waited = started.elapsed();
            if Duration::from_millis(behind) > limit || waited > limit {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    last_timestamp,
                    now,
                    ?waited,
                    ?limit,
                    "clock regression exceeds tolerance"
                );
                return Err(Error::ClockRegression {
                    last_timestamp,
                    now,
                    waited,
                });
            }
        }

        Ok(Poll::Pending { yield_for: behind })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

impl<ID, T> fmt::Debug for IdGenerator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = core::any::type_name::<ID>();
        let layout = full.rsplit("::").next().unwrap_or(full);
        f.debug_struct("IdGenerator")
            .field("layout", &layout)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
