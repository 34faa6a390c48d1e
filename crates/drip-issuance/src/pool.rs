//! Per-pool issuance record and the accrual step computed from it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use drip_core::error::{LedgerError, MathError};
use drip_core::math::{checked_add, checked_sub};
use drip_core::types::{Amount, Timestamp};

use crate::schedule::Schedule;

/// Parameters for registering a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolParams {
    /// Maximum the pool may ever issue. `None` uses the ledger's default cap.
    pub supply_cap: Option<Amount>,
    /// Initial weekly distribution rate.
    pub weekly_distribution: Amount,
}

/// Issuance state of a single pool.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct PoolRecord {
    /// Amount issued over one week at the current rate.
    pub weekly_distribution: Amount,
    /// Time up to which accrual has been accounted for.
    pub last_update_time: Timestamp,
    /// Cumulative amount paid out by `issue`. Never decreases.
    pub total_issued: Amount,
    /// Hard ceiling on `total_issued + carried`.
    pub supply_cap: Amount,
    /// Accrual reconciled by a rate or supply change and reserved against
    /// the cap. The next `issue` pays it out and adds it to `total_issued`.
    pub carried: Amount,
}

/// Outcome of accruing a record forward to some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    /// Newly accrued amount, already clamped to the available room.
    pub fresh: Amount,
    /// New value for `last_update_time`.
    pub cursor: Timestamp,
    /// No room was left before accruing.
    pub exhausted: bool,
}

impl PoolRecord {
    pub fn new(now: Timestamp, supply_cap: Amount, weekly_distribution: Amount) -> Self {
        Self {
            weekly_distribution,
            last_update_time: now,
            total_issued: 0,
            supply_cap,
            carried: 0,
        }
    }

    /// Issued plus carried: everything already counted against the cap.
    pub fn committed(&self) -> Result<Amount, MathError> {
        checked_add(self.total_issued, self.carried)
    }

    /// Amount the pool may still accrue before reaching its cap.
    pub fn remaining(&self) -> Result<Amount, MathError> {
        checked_sub(self.supply_cap, self.committed()?)
    }

    pub fn is_exhausted(&self) -> bool {
        self.total_issued.saturating_add(self.carried) >= self.supply_cap
    }

    /// Check the record's internal invariants.
    pub fn check(&self) -> Result<(), String> {
        let committed = self
            .committed()
            .map_err(|_| "total_issued + carried overflows".to_string())?;
        if committed > self.supply_cap {
            return Err(format!(
                "total_issued {} + carried {} exceeds supply_cap {}",
                self.total_issued, self.carried, self.supply_cap
            ));
        }
        Ok(())
    }

    /// Accrue from `last_update_time` to `now` without mutating.
    ///
    /// `outer_room` bounds the result in addition to the pool's own cap
    /// (the remaining global supply, or `Amount::MAX` without one). When the
    /// accrual uses up the last of the room the cursor moves all the way to
    /// `now`, since nothing more could have accrued in the remainder.
    pub(crate) fn step(
        &self,
        schedule: &Schedule,
        now: Timestamp,
        outer_room: Amount,
    ) -> Result<Step, LedgerError> {
        if now < self.last_update_time {
            warn!(last = self.last_update_time, now, "pool: clock went backwards");
            return Err(LedgerError::ClockWentBackwards {
                last: self.last_update_time,
                now,
            });
        }

        let room = self.remaining()?.min(outer_room);
        if room == 0 {
            return Ok(Step {
                fresh: 0,
                cursor: now,
                exhausted: true,
            });
        }

        let periods = schedule.periods(now - self.last_update_time);
        let fresh = schedule.accrued_within(self.weekly_distribution, periods, room)?;
        let cursor = if fresh == room {
            now
        } else {
            schedule.cursor(self.last_update_time, now)
        };

        Ok(Step {
            fresh,
            cursor,
            exhausted: false,
        })
    }

    /// Copy of this record with `step` folded into `carried`.
    /// `total_issued` is left alone.
    pub(crate) fn reconciled(&self, step: &Step) -> Result<Self, MathError> {
        Ok(Self {
            carried: checked_add(self.carried, step.fresh)?,
            last_update_time: step.cursor,
            ..self.clone()
        })
    }

    /// Copy of this record after paying out `step` plus anything carried,
    /// together with the payout. An exhausted step keeps the cursor.
    pub(crate) fn paid_out(&self, step: &Step) -> Result<(Self, Amount), MathError> {
        let payout = checked_add(self.carried, step.fresh)?;
        let last_update_time = if step.exhausted {
            self.last_update_time
        } else {
            step.cursor
        };
        let next = Self {
            total_issued: checked_add(self.total_issued, payout)?,
            carried: 0,
            last_update_time,
            ..self.clone()
        };
        Ok((next, payout))
    }
}
