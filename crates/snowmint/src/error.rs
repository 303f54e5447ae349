use core::time::Duration;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `snowmint` can emit.
///
/// Sequence exhaustion and ordinary millisecond rollover are handled inside
/// the generator and never show up here.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The node id does not fit the layout's node field.
    #[error("node id {node_id} exceeds the maximum of {max} for this layout")]
    NodeIdOutOfRange {
        /// The rejected node id.
        node_id: u64,
        /// The largest node id the layout can encode.
        max: u64,
    },

    /// The generator configuration is unusable.
    #[error("invalid generator configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },

    /// The clock moved backward further, or for longer, than the configured
    /// tolerance allows.
    #[error(
        "clock moved backward: last issued timestamp {last_timestamp}, clock reads {now} (waited {waited:?})"
    )]
    ClockRegression {
        /// Timestamp of the most recently issued ID.
        last_timestamp: u64,
        /// The clock reading that was behind it.
        now: u64,
        /// How long the caller was held before giving up.
        waited: Duration,
    },

    /// The clock reading no longer fits the layout's timestamp field.
    #[error("timestamp {timestamp} exceeds the maximum of {max} for this layout")]
    TimestampOverflow {
        /// The clock reading, in milliseconds since the epoch.
        timestamp: u64,
        /// The largest timestamp the layout can encode.
        max: u64,
    },

    /// The generator's lock was poisoned by a panicking thread.
    ///
    /// Only produced when using the standard library mutex; with the
    /// `parking-lot` feature the lock cannot be poisoned.
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// A string could not be parsed as a decimal ID.
    #[error("invalid decimal id: {input:?}")]
    ParseId {
        /// The rejected input.
        input: String,
    },
}

#[cfg(not(feature = "parking-lot"))]
impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
