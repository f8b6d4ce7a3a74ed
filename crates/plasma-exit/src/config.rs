//! Protocol constants of one exit game instance.

use plasma_exit_core::merkle::MAX_TREE_DEPTH;
use plasma_exit_core::{Address, ExitableTimestamp, U256, DEFAULT_TREE_DEPTH};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Bond posted with every standard exit, in wei.
pub const DEFAULT_STANDARD_EXIT_BOND: u64 = 31_415_926_535;

/// One week, in seconds.
pub const DEFAULT_MIN_EXIT_PERIOD: u64 = 7 * 24 * 60 * 60;

/// Operator blocks are multiples of this; deposits fill the gaps.
pub const DEFAULT_CHILD_BLOCK_INTERVAL: u64 = 1000;

/// Configuration for a [`StandardExitGame`](crate::StandardExitGame).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitGameConfig {
    /// Bond required to start an exit, paid to a successful challenger.
    pub standard_exit_bond: U256,
    /// Minimum exit period in seconds.
    pub min_exit_period: u64,
    /// Spacing of operator-submitted block numbers.
    pub child_block_interval: u64,
    /// Depth of the transaction Merkle trees in submitted blocks.
    pub merkle_tree_depth: usize,
    /// Identity the game registers queued exits under.
    pub exit_processor: Address,
    /// The exit queue. Only it may call back into `process_exit`.
    pub exit_queue: Address,
}

impl Default for ExitGameConfig {
    fn default() -> Self {
        Self {
            standard_exit_bond: U256::from(DEFAULT_STANDARD_EXIT_BOND),
            min_exit_period: DEFAULT_MIN_EXIT_PERIOD,
            child_block_interval: DEFAULT_CHILD_BLOCK_INTERVAL,
            merkle_tree_depth: DEFAULT_TREE_DEPTH,
            exit_processor: Address::ZERO,
            exit_queue: Address::ZERO,
        }
    }
}

impl ExitGameConfig {
    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.standard_exit_bond.is_zero() {
            return Err(ConfigError::ZeroBond);
        }
        if self.child_block_interval == 0 {
            return Err(ConfigError::ZeroChildBlockInterval);
        }
        if self.min_exit_period == 0 {
            return Err(ConfigError::ZeroMinExitPeriod);
        }
        if self.merkle_tree_depth == 0 || self.merkle_tree_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::UnsupportedTreeDepth(self.merkle_tree_depth));
        }
        Ok(())
    }

    /// Load and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The exitable-timestamp policy for this game.
    pub fn exitable_timestamp(&self) -> ExitableTimestamp {
        ExitableTimestamp::new(self.min_exit_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExitGameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.min_exit_period, 604_800);
        assert_eq!(config.standard_exit_bond, U256::from(31_415_926_535u64));
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = ExitGameConfig::default();
        config.standard_exit_bond = U256::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroBond)));

        let mut config = ExitGameConfig::default();
        config.child_block_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChildBlockInterval)));

        let mut config = ExitGameConfig::default();
        config.min_exit_period = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMinExitPeriod)));

        let mut config = ExitGameConfig::default();
        config.merkle_tree_depth = 65;
        assert!(matches!(config.validate(), Err(ConfigError::UnsupportedTreeDepth(65))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = ExitGameConfig::from_json(r#"{"min_exit_period": 60}"#).unwrap();
        assert_eq!(config.min_exit_period, 60);
        assert_eq!(config.child_block_interval, DEFAULT_CHILD_BLOCK_INTERVAL);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(matches!(
            ExitGameConfig::from_json(r#"{"child_block_interval": 0}"#),
            Err(ConfigError::ZeroChildBlockInterval)
        ));
        assert!(matches!(
            ExitGameConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ExitGameConfig {
            exit_processor: Address::repeat_byte(9),
            exit_queue: Address::repeat_byte(7),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ExitGameConfig::from_json(&json).unwrap(), config);
    }
}
