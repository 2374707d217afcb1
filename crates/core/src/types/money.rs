//! Price arithmetic helpers.
//!
//! Prices are carried as [`rust_decimal::Decimal`] in the currency's
//! standard unit (dollars). The payment provider wants amounts in minor
//! units (cents), rounded to the nearest cent.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Convert a price in standard units to minor units (cents).
///
/// Rounds to the nearest cent, half away from zero, matching the checkout
/// provider's expectation of `round(price * 100)`.
///
/// Returns `None` when the scaled amount does not fit in an `i64`.
#[must_use]
pub fn minor_units(price: Decimal) -> Option<i64> {
    price
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
