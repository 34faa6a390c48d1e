//! Protocol constants. All token amounts are in base units (1 token = 10^18 units).

use crate::types::Amount;

/// Decimal places of the reward token.
pub const DECIMALS: u32 = 18;

/// Base units per whole token.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Length of the nominal distribution period. Weekly rates are expressed
/// against this duration.
pub const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

/// Thirty-day month, used by schedules and tests that reason in months.
pub const SECONDS_PER_MONTH: u64 = 30 * SECONDS_PER_DAY;

/// Default accrual granularity: one second.
pub const DEFAULT_ACCRUAL_INTERVAL_SECS: u64 = 1;

/// Default per-pool supply cap when a pool is registered without one.
pub const DEFAULT_POOL_SUPPLY_CAP: Amount = 32_000_000 * UNIT;

/// Convert a whole-token count into base units.
///
/// Returns `None` if the result does not fit in an [`Amount`].
///
/// # Examples
///
/// ```
/// use drip_core::constants::{tokens, UNIT};
/// assert_eq!(tokens(3), Some(3 * UNIT));
/// assert_eq!(tokens(u128::MAX), None);
/// ```
pub fn tokens(whole: u128) -> Option<Amount> {
    whole.checked_mul(UNIT)
}
