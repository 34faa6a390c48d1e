//! Simulation scenarios loaded from JSON.
//!
//! Amounts are given in whole tokens and converted to base units on load.
//! Pools are named by label; each label maps to a stable address.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use drip_core::constants::{tokens, DEFAULT_ACCRUAL_INTERVAL_SECS};
use drip_core::types::{Amount, Timestamp};
use drip_issuance::LedgerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub label: String,
    /// Supply cap in whole tokens. Defaults to the ledger's default cap.
    #[serde(default)]
    pub cap_tokens: Option<u128>,
    pub weekly_tokens: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChange {
    /// Seconds after the scenario start.
    pub at_secs: u64,
    pub pool: String,
    pub weekly_tokens: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub start_time: Timestamp,
    #[serde(default = "default_interval")]
    pub accrual_interval_secs: u64,
    #[serde(default)]
    pub global_cap_tokens: Option<u128>,
    pub pools: Vec<PoolSpec>,
    #[serde(default)]
    pub rate_changes: Vec<RateChange>,
}

fn default_interval() -> u64 {
    DEFAULT_ACCRUAL_INTERVAL_SECS
}

impl Default for Scenario {
    /// Two pools with a 32M cap each; the first is raised to 8M per week
    /// after one week.
    fn default() -> Self {
        Self {
            start_time: 1_700_000_000,
            accrual_interval_secs: DEFAULT_ACCRUAL_INTERVAL_SECS,
            global_cap_tokens: None,
            pools: vec![
                PoolSpec {
                    label: "eth".to_string(),
                    cap_tokens: Some(32_000_000),
                    weekly_tokens: 1_000,
                },
                PoolSpec {
                    label: "erc20".to_string(),
                    cap_tokens: Some(32_000_000),
                    weekly_tokens: 500,
                },
            ],
            rate_changes: vec![RateChange {
                at_secs: 7 * 24 * 3600,
                pool: "eth".to_string(),
                weekly_tokens: 8_000_000,
            }],
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let scenario: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pools.is_empty() {
            bail!("scenario has no pools");
        }
        let mut labels = HashSet::new();
        for pool in &self.pools {
            if !labels.insert(pool.label.as_str()) {
                bail!("duplicate pool label {:?}", pool.label);
            }
        }
        for change in &self.rate_changes {
            if !labels.contains(change.pool.as_str()) {
                bail!("rate change references unknown pool {:?}", change.pool);
            }
        }
        self.ledger_config()?.validate()?;
        Ok(())
    }

    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        let global_supply_cap = self.global_cap_tokens.map(to_units).transpose()?;
        Ok(LedgerConfig {
            accrual_interval_secs: self.accrual_interval_secs,
            global_supply_cap,
            ..LedgerConfig::default()
        })
    }
}

/// Whole tokens to base units.
pub fn to_units(whole: u128) -> Result<Amount> {
    tokens(whole).with_context(|| format!("{whole} tokens overflows the amount type"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::constants::UNIT;

    #[test]
    fn default_scenario_is_valid() {
        assert!(Scenario::default().validate().is_ok());
    }

    #[test]
    fn parse_minimal_document() {
        let raw = r#"{
            "start_time": 1000,
            "pools": [{ "label": "a", "weekly_tokens": 7 }]
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).unwrap();
        assert_eq!(scenario.accrual_interval_secs, 1);
        assert_eq!(scenario.pools[0].cap_tokens, None);
        assert!(scenario.rate_changes.is_empty());
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn duplicate_labels_rejected() {
        let mut scenario = Scenario::default();
        scenario.pools[1].label = "eth".to_string();
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn unknown_rate_change_pool_rejected() {
        let mut scenario = Scenario::default();
        scenario.rate_changes[0].pool = "btc".to_string();
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn bad_interval_rejected() {
        let scenario = Scenario {
            accrual_interval_secs: 13,
            ..Scenario::default()
        };
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn global_cap_converted_to_units() {
        let scenario = Scenario {
            global_cap_tokens: Some(10),
            ..Scenario::default()
        };
        assert_eq!(scenario.ledger_config().unwrap().global_supply_cap, Some(10 * UNIT));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(&path, serde_json::to_string(&Scenario::default()).unwrap()).unwrap();
        assert_eq!(Scenario::load(&path).unwrap(), Scenario::default());
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Scenario::load(&dir.path().join("absent.json")).is_err());
    }
}
