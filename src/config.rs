//! Engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document
//! is a valid configuration:
//!
//! ```
//! use site_schedule::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("capacity_percent = 100").unwrap();
//! assert_eq!(config.default_total_modifications, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Allocation above this share of a member's time is over-allocation.
pub const FULL_ALLOCATION_PERCENT: u32 = 100;

/// Tunables shared by the engine components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Capacity of one team member, in percent. Totals strictly above it
    /// are over-allocated.
    pub capacity_percent: u32,
    /// Modification events allowed when a ledger is opened without an
    /// explicit policy.
    pub default_total_modifications: u32,
    /// Days booked per modification when the caller does not say.
    pub default_days_per_modification: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_percent: FULL_ALLOCATION_PERCENT,
            default_total_modifications: 3,
            default_days_per_modification: 5,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the capacity threshold.
    pub fn with_capacity(mut self, capacity_percent: u32) -> Self {
        self.capacity_percent = capacity_percent;
        self
    }

    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity_percent == 0 {
            return Err(EngineError::Config(
                "capacity_percent must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Whether `total` exceeds the configured capacity.
    #[inline]
    pub fn is_overallocated(&self, total: u32) -> bool {
        total > self.capacity_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.capacity_percent, 100);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_toml_str(
            "capacity_percent = 120\ndefault_total_modifications = 2\n",
        )
        .unwrap();
        assert_eq!(config.capacity_percent, 120);
        assert_eq!(config.default_total_modifications, 2);
        assert_eq!(config.default_days_per_modification, 5);
        assert!(!config.is_overallocated(120));
        assert!(config.is_overallocated(121));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EngineConfig::from_toml_str("capacity_percent = 0").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(EngineConfig::from_toml_str("capacity = 100").is_err());
    }
}
