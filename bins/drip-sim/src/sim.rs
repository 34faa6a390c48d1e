//! Drives a ledger through a scenario on a manual clock.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use drip_core::clock::ManualClock;
use drip_core::constants::UNIT;
use drip_core::traits::AllowAll;
use drip_core::types::{Address, Amount, PoolId, Timestamp};
use drip_issuance::{IssuanceLedger, LedgerSnapshot, PoolParams};

use crate::scenario::{to_units, RateChange, Scenario};

/// Issuer identity used for all administrative calls.
const OPERATOR: Address = Address::ZERO;

/// One `issue` call on one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tick {
    pub elapsed_secs: u64,
    pub pool: String,
    pub issued: Amount,
    pub total_issued: Amount,
}

/// Final per-pool state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    pub label: String,
    pub address: String,
    pub weekly_distribution: Amount,
    pub supply_cap: Amount,
    pub total_issued: Amount,
    pub paid_out: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub ticks: Vec<Tick>,
    pub pools: Vec<PoolSummary>,
    pub global_issued: Option<Amount>,
    #[serde(skip)]
    pub snapshot: LedgerSnapshot,
}

/// Run `scenario` for `duration_secs`, issuing every pool each `step_secs`.
///
/// Steps are walked one at a time, with rate changes merged in at their
/// offsets. A change fires before any issue scheduled for the same instant.
pub fn run(scenario: &Scenario, duration_secs: u64, step_secs: u64) -> Result<Report> {
    ensure!(step_secs > 0, "step must be at least one second");
    scenario.validate()?;

    let clock = Arc::new(ManualClock::new(scenario.start_time));
    let ledger = IssuanceLedger::new(scenario.ledger_config()?, clock.clone(), Arc::new(AllowAll))?;

    let mut addresses: HashMap<&str, PoolId> = HashMap::new();
    for spec in &scenario.pools {
        let pool = Address::from_label(&spec.label);
        let params = PoolParams {
            supply_cap: spec.cap_tokens.map(to_units).transpose()?,
            weekly_distribution: to_units(spec.weekly_tokens)?,
        };
        ledger
            .register_pool(&OPERATOR, pool, params)
            .with_context(|| format!("failed to register pool {:?}", spec.label))?;
        addresses.insert(spec.label.as_str(), pool);
    }

    let mut changes: Vec<&RateChange> = scenario
        .rate_changes
        .iter()
        .filter(|c| c.at_secs <= duration_secs)
        .collect();
    changes.sort_by_key(|c| c.at_secs);
    let mut changes = changes.into_iter().peekable();

    let mut paid: HashMap<&str, Amount> = HashMap::new();
    let mut ticks = Vec::new();
    let mut next_tick = step_secs.min(duration_secs);

    loop {
        let elapsed = match changes.peek() {
            Some(change) if change.at_secs < next_tick => change.at_secs,
            _ => next_tick,
        };
        clock.set(scenario.start_time.saturating_add(elapsed));

        while let Some(change) = changes.next_if(|c| c.at_secs == elapsed) {
            let pool = addresses[change.pool.as_str()];
            let reconciled =
                ledger.set_weekly_distribution(&OPERATOR, &pool, to_units(change.weekly_tokens)?)?;
            debug!(pool = %change.pool, elapsed, reconciled, "sim: rate changed");
        }

        if elapsed < next_tick {
            continue;
        }
        for spec in &scenario.pools {
            let pool = addresses[spec.label.as_str()];
            let issued = ledger.issue(&pool)?;
            *paid.entry(spec.label.as_str()).or_default() += issued;
            ticks.push(Tick {
                elapsed_secs: elapsed,
                pool: spec.label.clone(),
                issued,
                total_issued: ledger.total_issued(&pool)?,
            });
        }

        if next_tick == duration_secs {
            break;
        }
        next_tick = next_tick.saturating_add(step_secs).min(duration_secs);
    }

    let mut pools = Vec::with_capacity(scenario.pools.len());
    for spec in &scenario.pools {
        let pool = addresses[spec.label.as_str()];
        let record = ledger.pool(&pool)?;
        pools.push(PoolSummary {
            label: spec.label.clone(),
            address: pool.to_string(),
            weekly_distribution: record.weekly_distribution,
            supply_cap: record.supply_cap,
            total_issued: record.total_issued,
            paid_out: paid.get(spec.label.as_str()).copied().unwrap_or(0),
        });
    }

    let report = Report {
        start_time: scenario.start_time,
        end_time: ledger.now(),
        ticks,
        pools,
        global_issued: ledger.global_issued(),
        snapshot: ledger.snapshot(),
    };
    info!(
        pools = report.pools.len(),
        ticks = report.ticks.len(),
        end_time = report.end_time,
        "sim: run complete"
    );
    Ok(report)
}

/// Render base units as whole tokens with six decimals, rounded down.
pub fn format_tokens(amount: Amount) -> String {
    let whole = amount / UNIT;
    let micros = (amount % UNIT) / (UNIT / 1_000_000);
    format!("{whole}.{micros:06}")
}
