//! Linear accrual schedule.
//!
//! Converts elapsed time and a weekly rate into an issuable amount:
//!
//! ```text
//! periods          = elapsed_secs / interval
//! periods_per_week = SECONDS_PER_WEEK / interval
//! accrued          = floor(weekly * periods / periods_per_week)
//! ```
//!
//! Flooring at every computation means the ledger can only under-issue, by
//! less than one period's worth of rate per call.

use drip_core::constants::SECONDS_PER_WEEK;
use drip_core::error::{LedgerError, MathError};
use drip_core::math::mul_div_floor;
use drip_core::types::{Amount, Timestamp};

/// Accrual schedule for a given interval length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    interval_secs: u64,
    periods_per_week: u64,
}

impl Schedule {
    /// Build a schedule. `interval_secs` must be non-zero and divide a week.
    pub fn new(interval_secs: u64) -> Result<Self, LedgerError> {
        if interval_secs == 0 || SECONDS_PER_WEEK % interval_secs != 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "invalid accrual interval: {interval_secs}s"
            )));
        }
        Ok(Self {
            interval_secs,
            periods_per_week: SECONDS_PER_WEEK / interval_secs,
        })
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn periods_per_week(&self) -> u64 {
        self.periods_per_week
    }

    /// Whole accrual periods contained in `elapsed_secs`.
    pub fn periods(&self, elapsed_secs: u64) -> u64 {
        elapsed_secs / self.interval_secs
    }

    /// The timestamp up to which accrual from `last` has been accounted for
    /// at `now`: `now` rounded down to a whole number of periods after `last`.
    pub fn cursor(&self, last: Timestamp, now: Timestamp) -> Timestamp {
        let elapsed = now.saturating_sub(last);
        now - elapsed % self.interval_secs
    }

    /// Exact floored accrual of `weekly` over `periods`.
    ///
    /// Fails with [`MathError::Overflow`] only when the result itself does
    /// not fit in an [`Amount`].
    pub fn accrued(&self, weekly: Amount, periods: u64) -> Result<Amount, MathError> {
        mul_div_floor(weekly, periods, self.periods_per_week)
    }

    /// Accrual of `weekly` over `periods`, saturated at `room`.
    ///
    /// A result too large for an [`Amount`] is necessarily larger than any
    /// room, so it saturates instead of failing.
    pub fn accrued_within(
        &self,
        weekly: Amount,
        periods: u64,
        room: Amount,
    ) -> Result<Amount, MathError> {
        match self.accrued(weekly, periods) {
            Ok(amount) => Ok(amount.min(room)),
            Err(MathError::Overflow) => Ok(room),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::constants::{SECONDS_PER_DAY, SECONDS_PER_MINUTE, UNIT};
    use proptest::prelude::*;

    fn per_second() -> Schedule {
        Schedule::new(1).unwrap()
    }

    #[test]
    fn rejects_bad_intervals() {
        assert!(Schedule::new(0).is_err());
        assert!(Schedule::new(11).is_err());
        assert!(Schedule::new(SECONDS_PER_WEEK * 2).is_err());
    }

    #[test]
    fn periods_per_week() {
        assert_eq!(per_second().periods_per_week(), SECONDS_PER_WEEK);
        assert_eq!(
            Schedule::new(SECONDS_PER_MINUTE).unwrap().periods_per_week(),
            10_080
        );
    }

    #[test]
    fn zero_elapsed_accrues_nothing() {
        let s = per_second();
        assert_eq!(s.accrued(1_000 * UNIT, s.periods(0)), Ok(0));
    }

    #[test]
    fn full_week_accrues_weekly_rate() {
        let s = per_second();
        let weekly = 8_000_000 * UNIT;
        assert_eq!(s.accrued(weekly, SECONDS_PER_WEEK), Ok(weekly));
    }

    #[test]
    fn one_day_is_a_seventh() {
        let s = per_second();
        let weekly = 7_000 * UNIT;
        assert_eq!(s.accrued(weekly, SECONDS_PER_DAY), Ok(1_000 * UNIT));
    }

    #[test]
    fn accrual_floors() {
        let s = per_second();
        // 1 unit per week: any partial week floors to zero.
        assert_eq!(s.accrued(1, SECONDS_PER_WEEK - 1), Ok(0));
        assert_eq!(s.accrued(1, SECONDS_PER_WEEK), Ok(1));
    }

    #[test]
    fn minute_interval_ignores_partial_minutes() {
        let s = Schedule::new(SECONDS_PER_MINUTE).unwrap();
        assert_eq!(s.periods(59), 0);
        assert_eq!(s.periods(119), 1);
        assert_eq!(s.cursor(1_000, 1_119), 1_060);
    }

    #[test]
    fn cursor_is_now_for_per_second() {
        let s = per_second();
        assert_eq!(s.cursor(10, 12_345), 12_345);
        assert_eq!(s.cursor(10, 10), 10);
    }

    #[test]
    fn within_clamps_to_room() {
        let s = per_second();
        let weekly = 1_000 * UNIT;
        assert_eq!(s.accrued_within(weekly, SECONDS_PER_WEEK, 10 * UNIT), Ok(10 * UNIT));
        assert_eq!(s.accrued_within(weekly, SECONDS_PER_WEEK, 0), Ok(0));
    }

    #[test]
    fn within_saturates_instead_of_overflowing() {
        let s = per_second();
        assert_eq!(s.accrued(u128::MAX, u64::MAX), Err(MathError::Overflow));
        assert_eq!(s.accrued_within(u128::MAX, u64::MAX, 42), Ok(42));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn accrual_is_monotonic_in_time(
            weekly in 0u128..=1_000_000_000 * UNIT,
            a in 0u64..=100 * SECONDS_PER_WEEK,
            b in 0u64..=100 * SECONDS_PER_WEEK,
        ) {
            let s = per_second();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(s.accrued(weekly, lo).unwrap() <= s.accrued(weekly, hi).unwrap());
        }

        #[test]
        fn split_accrual_loses_at_most_one_unit(
            weekly in 0u128..=1_000_000_000 * UNIT,
            t1 in 0u64..=10 * SECONDS_PER_WEEK,
            t2 in 0u64..=10 * SECONDS_PER_WEEK,
        ) {
            let s = per_second();
            let whole = s.accrued(weekly, t1 + t2).unwrap();
            let split = s.accrued(weekly, t1).unwrap() + s.accrued(weekly, t2).unwrap();
            prop_assert!(split <= whole);
            prop_assert!(whole - split <= 1);
        }
    }
}
