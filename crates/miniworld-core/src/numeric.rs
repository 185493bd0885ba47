//! Numeric safety policy shared by the financial and walkability models.
//!
//! Every guarded division in the crate goes through [`safe_div`] so that a
//! zero (or overflowing) denominator always degrades to the same caller
//! supplied default instead of panicking.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Percent, Rate};

const ONE_HUNDRED: Decimal = dec!(100);

/// `numerator / denominator`, or `default` when the denominator is zero or
/// the quotient does not fit in a `Decimal`.
pub fn safe_div(numerator: Decimal, denominator: Decimal, default: Decimal) -> Decimal {
    if denominator.is_zero() {
        return default;
    }
    numerator.checked_div(denominator).unwrap_or(default)
}

/// Percent-to-fraction conversion (65 -> 0.65).
pub fn pct(value: Percent) -> Rate {
    value / ONE_HUNDRED
}

/// Fraction-to-percent conversion (0.65 -> 65).
pub fn to_pct(value: Rate) -> Percent {
    value * ONE_HUNDRED
}

/// `min(x, 1)`. Used for sub-scores that saturate at a target.
pub fn clamp_unit(x: Decimal) -> Decimal {
    x.min(Decimal::ONE)
}

/// `(1 + rate)^periods` by square-and-multiply, so long amortisation
/// schedules cost O(log n). Returns `None` once the product leaves the
/// representable range.
pub fn compound_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    let mut base = Decimal::ONE + rate;
    let mut remaining = periods;
    let mut compound = Decimal::ONE;
    while remaining > 0 {
        if remaining & 1 == 1 {
            compound = compound.checked_mul(base)?;
        }
        remaining >>= 1;
        if remaining > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(compound)
}

/// True when `value` is outside `[0, 100]`.
pub fn outside_percent_range(value: Percent) -> bool {
    value < Decimal::ZERO || value > ONE_HUNDRED
}
