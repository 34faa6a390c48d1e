//! Ledger configuration.
//!
//! [`LedgerConfig`] carries the deployment parameters of a ledger: accrual
//! granularity and the supply model. It can be built programmatically with
//! struct update syntax or deserialized from a scenario file.

use serde::{Deserialize, Serialize};

use drip_core::constants::{
    DEFAULT_ACCRUAL_INTERVAL_SECS, DEFAULT_POOL_SUPPLY_CAP, SECONDS_PER_WEEK,
};
use drip_core::error::LedgerError;
use drip_core::types::Amount;

/// Configuration for an [`IssuanceLedger`](crate::IssuanceLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Accrual granularity in seconds. Elapsed time is counted in whole
    /// intervals. Must be non-zero and divide a week evenly.
    pub accrual_interval_secs: u64,
    /// Cap shared by all pools. `None` bounds pools by their own caps only.
    pub global_supply_cap: Option<Amount>,
    /// Cap applied to pools registered without an explicit one.
    pub default_pool_cap: Amount,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            accrual_interval_secs: DEFAULT_ACCRUAL_INTERVAL_SECS,
            global_supply_cap: None,
            default_pool_cap: DEFAULT_POOL_SUPPLY_CAP,
        }
    }
}

impl LedgerConfig {
    /// Check the configuration for values the ledger cannot run with.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.accrual_interval_secs == 0 {
            return Err(LedgerError::InvalidConfig(
                "accrual_interval_secs must be non-zero".to_string(),
            ));
        }
        if SECONDS_PER_WEEK % self.accrual_interval_secs != 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "accrual_interval_secs {} does not divide a week ({SECONDS_PER_WEEK}s)",
                self.accrual_interval_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::constants::{SECONDS_PER_HOUR, SECONDS_PER_MINUTE, UNIT};

    #[test]
    fn default_is_per_second_with_32m_cap() {
        let cfg = LedgerConfig::default();
        assert_eq!(cfg.accrual_interval_secs, 1);
        assert_eq!(cfg.global_supply_cap, None);
        assert_eq!(cfg.default_pool_cap, 32_000_000 * UNIT);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn minute_and_hour_intervals_are_valid() {
        for interval in [SECONDS_PER_MINUTE, SECONDS_PER_HOUR, SECONDS_PER_WEEK] {
            let cfg = LedgerConfig {
                accrual_interval_secs: interval,
                ..LedgerConfig::default()
            };
            assert!(cfg.validate().is_ok(), "interval {interval} should be valid");
        }
    }

    #[test]
    fn zero_interval_rejected() {
        let cfg = LedgerConfig {
            accrual_interval_secs: 0,
            ..LedgerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn interval_not_dividing_week_rejected() {
        let cfg = LedgerConfig {
            accrual_interval_secs: 7_001,
            ..LedgerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn partial_document_fills_defaults() {
        let cfg: LedgerConfig = serde_json::from_str(r#"{"accrual_interval_secs": 60}"#).unwrap();
        assert_eq!(cfg.accrual_interval_secs, 60);
        assert_eq!(cfg.default_pool_cap, DEFAULT_POOL_SUPPLY_CAP);
    }
}
