use core::{fmt, hash::Hash};

/// A 64-bit Snowflake bit layout: timestamp, node id and sequence, packed most
/// significant first.
///
/// Because the timestamp occupies the high bits and the sequence the low
/// bits, two IDs minted by the same generator compare in minting order when
/// compared as plain `u64`s.
///
/// # Example
///
/// ```
/// use snowmint::{Snowflake, SnowflakeTwitterId};
///
/// let id = SnowflakeTwitterId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.node_id(), 2);
/// assert_eq!(id.sequence(), 1);
/// ```
pub trait Snowflake:
    Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash
{
    /// Returns the timestamp portion of the ID.
    fn timestamp(&self) -> u64;

    /// Returns the node id portion of the ID.
    fn node_id(&self) -> u64;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64;

    /// Returns the maximum possible value for the node id field.
    fn max_node_id() -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Packs the three components into an ID.
    ///
    /// Components are expected to be in range; out of range values trip a
    /// debug assertion and are masked in release builds.
    fn from_components(timestamp: u64, node_id: u64, sequence: u64) -> Self;

    /// Converts this ID into its raw `u64`.
    fn to_raw(&self) -> u64;

    /// Reinterprets a raw `u64` as this ID.
    fn from_raw(raw: u64) -> Self;
}

macro_rules! define_snowflake_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        node_id: $node_id_bits:expr,
        sequence: $sequence_bits:expr
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            // Compile-time check: the fields must cover exactly 64 bits.
            assert!(
                $reserved_bits + $timestamp_bits + $node_id_bits + $sequence_bits == u64::BITS,
                "Layout must match underlying type width"
            );
        };

        impl $name {
            pub const RESERVED_BITS: u32 = $reserved_bits;
            pub const TIMESTAMP_BITS: u32 = $timestamp_bits;
            pub const NODE_ID_BITS: u32 = $node_id_bits;
            pub const SEQUENCE_BITS: u32 = $sequence_bits;

            pub const SEQUENCE_SHIFT: u32 = 0;
            pub const NODE_ID_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
            pub const TIMESTAMP_SHIFT: u32 = Self::NODE_ID_SHIFT + Self::NODE_ID_BITS;

            pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
            pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;
            pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

            /// Packs the components, masking each to its field width.
            #[must_use]
            pub const fn from(timestamp: u64, node_id: u64, sequence: u64) -> Self {
                let t = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
                let n = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
                let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                Self { id: t | n | s }
            }

            /// Extracts the timestamp from the packed ID.
            #[must_use]
            pub const fn timestamp(&self) -> u64 {
                (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
            }

            /// Extracts the node id from the packed ID.
            #[must_use]
            pub const fn node_id(&self) -> u64 {
                (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
            }

            /// Extracts the sequence number from the packed ID.
            #[must_use]
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            #[must_use]
            pub const fn to_raw(&self) -> u64 {
                self.id
            }

            #[must_use]
            pub const fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }

            /// Returns the ID as a zero-padded 20-digit string.
            ///
            /// Padded strings sort lexicographically in the same order as
            /// the IDs themselves.
            #[must_use]
            pub fn to_padded_string(&self) -> String {
                format!("{:020}", self.id)
            }
        }

        impl Snowflake for $name {
            fn timestamp(&self) -> u64 {
                self.timestamp()
            }

            fn node_id(&self) -> u64 {
                self.node_id()
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            fn max_node_id() -> u64 {
                Self::NODE_ID_MASK
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            fn from_components(timestamp: u64, node_id: u64, sequence: u64) -> Self {
                debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
                debug_assert!(node_id <= Self::NODE_ID_MASK, "node_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                Self::from(timestamp, node_id, sequence)
            }

            fn to_raw(&self) -> u64 {
                self.to_raw()
            }

            fn from_raw(raw: u64) -> Self {
                Self::from_raw(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.to_raw()
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self::from_raw(raw)
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>()
                    .map(Self::from_raw)
                    .map_err(|_| $crate::Error::ParseId { input: s.to_owned() })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let full = core::any::type_name::<Self>();
                let name = full.rsplit("::").next().unwrap_or(full);
                f.debug_struct(name)
                    .field("id", &format_args!("{} (0x{:016x})", self.id, self.id))
                    .field("timestamp", &format_args!("{} (0x{:x})", self.timestamp(), self.timestamp()))
                    .field("node_id", &format_args!("{} (0x{:x})", self.node_id(), self.node_id()))
                    .field("sequence", &format_args!("{} (0x{:x})", self.sequence(), self.sequence()))
                    .finish()
            }
        }
    };
}

define_snowflake_id!(
    /// A 64-bit Snowflake ID using the Twitter layout
    ///
    /// - 1 bit reserved
    /// - 41 bits timestamp (ms since [`TWITTER_EPOCH`])
    /// - 10 bits node id
    /// - 12 bits sequence
    ///
    /// ```text
    ///  Bit Index:  63           63 62            22 21             12 11             0
    ///              +--------------+----------------+-----------------+---------------+
    ///  Field:      | reserved (1) | timestamp (41) |  node id (10)   | sequence (12) |
    ///              +--------------+----------------+-----------------+---------------+
    ///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
    /// ```
    ///
    /// The reserved bit is always zero, so the raw value also fits an `i64`.
    ///
    /// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
    SnowflakeTwitterId,
    reserved: 1,
    timestamp: 41,
    node_id: 10,
    sequence: 12
);

define_snowflake_id!(
    /// A 64-bit Snowflake ID using the Discord layout
    ///
    /// - 42 bits timestamp (ms since [`DISCORD_EPOCH`])
    /// - 10 bits node id
    /// - 12 bits sequence
    ///
    /// ```text
    ///  Bit Index:  63             22 21             12 11             0
    ///              +----------------+-----------------+---------------+
    ///  Field:      | timestamp (42) |  node id (10)   | sequence (12) |
    ///              +----------------+-----------------+---------------+
    ///              |<----- MSB ---------- 64 bits --------- LSB ----->|
    /// ```
    ///
    /// [`DISCORD_EPOCH`]: crate::DISCORD_EPOCH
    SnowflakeDiscordId,
    reserved: 0,
    timestamp: 42,
    node_id: 10,
    sequence: 12
);
