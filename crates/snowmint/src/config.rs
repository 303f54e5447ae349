use core::time::Duration;

use crate::{Error, Result, id::Snowflake};

/// Default tolerance for a backward clock jump.
pub const DEFAULT_MAX_CLOCK_REGRESSION: Duration = Duration::from_secs(2);

/// Default pause between clock re-reads while the generator waits.
pub const DEFAULT_BACKOFF: Duration = Duration::from_micros(50);

/// Settings for an [`IdGenerator`].
///
/// All fields have defaults except the node id, which has to be assigned by
/// the caller so that it is unique across the fleet.
///
/// With the `serde` feature enabled this type can be deserialized from a
/// surrounding program's own configuration; missing fields take their
/// defaults.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use snowmint::GeneratorConfig;
///
/// let config = GeneratorConfig::new(12)
///     .with_max_clock_regression(Some(Duration::from_millis(500)))
///     .with_backoff(Duration::from_micros(20));
///
/// assert_eq!(config.node_id, 12);
/// ```
///
/// [`IdGenerator`]: crate::IdGenerator
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct GeneratorConfig {
    /// Identifies this generator among all generators sharing an ID space.
    ///
    /// Must fit the layout's node field; it is validated, never truncated.
    pub node_id: u64,

    /// How far, and for how long, the generator tolerates the clock reading
    /// earlier than the last issued timestamp.
    ///
    /// - `Some(limit)`: a regression larger than `limit` fails immediately
    ///   with [`Error::ClockRegression`]; a smaller one is waited out, failing
    ///   if the wait itself exceeds `limit`.
    /// - `None`: wait for the clock to catch up, however long that takes.
    pub max_clock_regression: Option<Duration>,

    /// Pause between clock re-reads while waiting on sequence exhaustion or a
    /// clock regression.
    pub backoff: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GeneratorConfig {
    /// Creates a configuration for `node_id` with default tolerances.
    #[must_use]
    pub const fn new(node_id: u64) -> Self {
        Self {
            node_id,
            max_clock_regression: Some(DEFAULT_MAX_CLOCK_REGRESSION),
            backoff: DEFAULT_BACKOFF,
        }
    }

    #[must_use]
    pub const fn with_max_clock_regression(mut self, limit: Option<Duration>) -> Self {
        self.max_clock_regression = limit;
        self
    }

    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Checks the configuration against the layout `ID`.
    ///
    /// # Errors
    ///
    /// - [`Error::NodeIdOutOfRange`] if the node id does not fit `ID`.
    /// - [`Error::InvalidConfig`] if the backoff is zero.
    pub fn validate<ID: Snowflake>(&self) -> Result<()> {
        let max = ID::max_node_id();
        if self.node_id > max {
            return Err(Error::NodeIdOutOfRange {
                node_id: self.node_id,
                max,
            });
        }
        if self.backoff.is_zero() {
            return Err(Error::InvalidConfig {
                reason: "backoff must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SnowflakeDiscordId, SnowflakeTwitterId};

    #[test]
    fn defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.node_id, 0);
        assert_eq!(
            config.max_clock_regression,
            Some(DEFAULT_MAX_CLOCK_REGRESSION)
        );
        assert_eq!(config.backoff, DEFAULT_BACKOFF);
    }

    #[test]
    fn validate_accepts_max_node_id() {
        let config = GeneratorConfig::new(1023);
        assert_eq!(config.validate::<SnowflakeTwitterId>(), Ok(()));
        assert_eq!(config.validate::<SnowflakeDiscordId>(), Ok(()));
    }

    #[test]
    fn validate_rejects_node_id_past_field_width() {
        let config = GeneratorConfig::new(1024);
        assert_eq!(
            config.validate::<SnowflakeTwitterId>(),
            Err(Error::NodeIdOutOfRange {
                node_id: 1024,
                max: 1023
            })
        );
    }

    #[test]
    fn validate_rejects_zero_backoff() {
        let config = GeneratorConfig::new(1).with_backoff(Duration::ZERO);
        assert!(matches!(
            config.validate::<SnowflakeTwitterId>(),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_fills_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"node_id": 9}"#).unwrap();
        assert_eq!(config, GeneratorConfig::new(9));

        let unbounded: GeneratorConfig =
            serde_json::from_str(r#"{"node_id": 9, "max_clock_regression": null}"#).unwrap();
        assert_eq!(unbounded.max_clock_regression, None);

        assert!(serde_json::from_str::<GeneratorConfig>(r#"{"node": 9}"#).is_err());
    }
}
