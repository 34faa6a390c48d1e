//! Overflow-checked `u128` arithmetic.
//!
//! Every ledger mutation goes through these helpers. None of them wrap or
//! truncate silently: a result that does not fit is an error, and the caller
//! aborts the whole operation.

use crate::error::MathError;

/// `a + b`, failing with [`MathError::Overflow`] past `u128::MAX`.
///
/// # Examples
///
/// ```
/// use drip_core::error::MathError;
/// use drip_core::math::checked_add;
/// assert_eq!(checked_add(2, 3), Ok(5));
/// assert_eq!(checked_add(u128::MAX, 1), Err(MathError::Overflow));
/// ```
pub fn checked_add(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// `a - b`, failing with [`MathError::Underflow`] when `b > a`.
///
/// # Examples
///
/// ```
/// use drip_core::error::MathError;
/// use drip_core::math::checked_sub;
/// assert_eq!(checked_sub(5, 3), Ok(2));
/// assert_eq!(checked_sub(1, 2), Err(MathError::Underflow));
/// ```
pub fn checked_sub(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

pub fn checked_mul(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

pub fn checked_div(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

/// Exact `floor(value * numerator / denominator)`.
///
/// `value` is split as `q * denominator + r`, so the result is
/// `q * numerator + floor(r * numerator / denominator)`. The second product
/// is below `2^128` because both `r` and `numerator` fit in 64 bits. The
/// call only fails when the final result itself exceeds `u128::MAX`.
///
/// # Examples
///
/// ```
/// use drip_core::math::mul_div_floor;
/// assert_eq!(mul_div_floor(10, 1, 3), Ok(3));
/// // The naive product overflows, the result does not.
/// assert_eq!(mul_div_floor(u128::MAX, 7, 7), Ok(u128::MAX));
/// ```
pub fn mul_div_floor(value: u128, numerator: u64, denominator: u64) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let d = denominator as u128;
    let n = numerator as u128;

    let whole = checked_mul(value / d, n)?;
    // r < 2^64 and n < 2^64, so the product cannot overflow.
    let fraction = (value % d) * n / d;

    checked_add(whole, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAX: u128 = u128::MAX;

    // --- checked_add ---

    #[test]
    fn add_small_values() {
        assert_eq!(checked_add(1, 1), Ok(2));
        assert_eq!(checked_add(0, 0), Ok(0));
    }

    #[test]
    fn add_reaches_max_exactly() {
        assert_eq!(checked_add(MAX - 1, 1), Ok(MAX));
        assert_eq!(checked_add(MAX, 0), Ok(MAX));
    }

    #[test]
    fn add_reverts_on_overflow() {
        assert_eq!(checked_add(MAX, 1), Err(MathError::Overflow));
        assert_eq!(checked_add(MAX / 2 + 1, MAX / 2 + 1), Err(MathError::Overflow));
    }

    // --- checked_sub ---

    #[test]
    fn sub_to_zero() {
        assert_eq!(checked_sub(7, 7), Ok(0));
    }

    #[test]
    fn sub_reverts_on_underflow() {
        assert_eq!(checked_sub(1, 2), Err(MathError::Underflow));
        assert_eq!(checked_sub(0, MAX), Err(MathError::Underflow));
    }

    // --- checked_mul / checked_div ---

    #[test]
    fn mul_overflow() {
        assert_eq!(checked_mul(MAX, 2), Err(MathError::Overflow));
        assert_eq!(checked_mul(MAX, 1), Ok(MAX));
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(checked_div(10, 0), Err(MathError::DivisionByZero));
        assert_eq!(checked_div(10, 3), Ok(3));
    }

    // --- mul_div_floor ---

    #[test]
    fn mul_div_floors() {
        assert_eq!(mul_div_floor(7, 1, 2), Ok(3));
        assert_eq!(mul_div_floor(1, 1, 604_800), Ok(0));
    }

    #[test]
    fn mul_div_zero_denominator() {
        assert_eq!(mul_div_floor(1, 1, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn mul_div_result_overflow() {
        assert_eq!(mul_div_floor(MAX, 2, 1), Err(MathError::Overflow));
        assert_eq!(mul_div_floor(MAX, u64::MAX, 604_800), Err(MathError::Overflow));
    }

    #[test]
    fn mul_div_large_value_small_ratio() {
        // value * numerator would overflow a naive u128 product.
        let value = MAX / 3;
        assert_eq!(mul_div_floor(value, 3, 4), Ok(value / 4 * 3 + (value % 4) * 3 / 4));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn mul_div_matches_wide_product(
            value in any::<u64>(),
            numerator in any::<u64>(),
            denominator in 1u64..=u64::MAX,
        ) {
            // With a 64-bit value the naive product fits in u128.
            let expected = (value as u128) * (numerator as u128) / (denominator as u128);
            prop_assert_eq!(mul_div_floor(value as u128, numerator, denominator), Ok(expected));
        }

        #[test]
        fn add_then_sub_is_identity(a in any::<u128>(), b in any::<u128>()) {
            if let Ok(sum) = checked_add(a, b) {
                prop_assert_eq!(checked_sub(sum, b), Ok(a));
            } else {
                prop_assert!(a > MAX - b);
            }
        }
    }
}
