use crate::id::Snowflake;

/// Outcome of a single non-blocking generation attempt.
///
/// Returned by [`IdGenerator::poll_id`]:
///
/// - [`Poll::Ready`] carries a freshly minted ID.
/// - [`Poll::Pending`] means nothing was minted because the sequence is
///   exhausted for the current millisecond, or the clock is behind the last
///   issued timestamp. Retry after roughly `yield_for` milliseconds.
///
/// # Example
///
/// ```
/// use snowmint::{IdGenerator, ManualClock, Poll, SnowflakeTwitterId};
///
/// let clock = ManualClock::new(7);
/// let generator = IdGenerator::<SnowflakeTwitterId, _>::with_clock(1, clock).unwrap();
///
/// match generator.poll_id().unwrap() {
///     Poll::Ready { id } => assert_eq!(id.timestamp(), 7),
///     Poll::Pending { yield_for } => println!("back off for {yield_for}ms"),
/// }
///
/// // Use up the rest of millisecond 7.
/// while let Some(id) = generator.poll_id().unwrap().ready() {
///     assert_eq!(id.timestamp(), 7);
/// }
/// assert!(generator.poll_id().unwrap().is_pending());
/// ```
///
/// [`IdGenerator::poll_id`]: crate::IdGenerator::poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<ID: Snowflake> {
    /// A unique ID was minted.
    Ready {
        /// The minted ID.
        id: ID,
    },
    /// No ID could be minted yet.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}

impl<ID: Snowflake> Poll<ID> {
    /// Returns the ID if one was minted.
    pub fn ready(self) -> Option<ID> {
        match self {
            Self::Ready { id } => Some(id),
            Self::Pending { .. } => None,
        }
    }

    /// Returns `true` if the attempt has to be retried later.
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
