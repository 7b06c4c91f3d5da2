//! Fixed-precision decimal arithmetic
//!
//! Every operation takes an explicit working precision (number of fractional digits)
//! and returns a value carrying exactly that many digits. Results of `add`,
//! `subtract`, `multiply` and `divide` are truncated toward zero at the precision,
//! the same way arbitrary-precision calculator libraries do.
//!
//! `round_up` is the only rounding primitive. It adds `0.5 × 10^-precision` and then
//! rounds half toward zero, which for non-negative values lands on the smallest
//! representable value that is not below the input.

use crate::types::CommissionError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

/// Largest supported precision
///
/// `rust_decimal` holds at most 28 fractional digits and `round_up` needs one
/// more digit than its target for the offset.
pub const MAX_PRECISION: u32 = 27;

fn checked_precision(precision: i32) -> Result<u32, CommissionError> {
    u32::try_from(precision)
        .ok()
        .filter(|p| *p <= MAX_PRECISION)
        .ok_or_else(|| CommissionError::invalid_precision(precision, MAX_PRECISION))
}

/// Pad to exactly `scale` fractional digits
///
/// `rescale` keeps a smaller scale when the padded mantissa would not fit in 96
/// bits, which is reported as an overflow of `operation`.
fn pad_scale(mut value: Decimal, scale: u32, operation: &str) -> Result<Decimal, CommissionError> {
    value.rescale(scale);
    if value.scale() != scale {
        return Err(CommissionError::arithmetic_overflow(operation));
    }
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    Ok(value)
}

/// Truncate toward zero and pad to exactly `scale` fractional digits
fn fix_scale(value: Decimal, scale: u32, operation: &str) -> Result<Decimal, CommissionError> {
    pad_scale(
        value.round_dp_with_strategy(scale, RoundingStrategy::ToZero),
        scale,
        operation,
    )
}

/// Add two values at the given precision
pub fn add(left: Decimal, right: Decimal, precision: i32) -> Result<Decimal, CommissionError> {
    let scale = checked_precision(precision)?;
    let sum = left
        .checked_add(right)
        .ok_or_else(|| CommissionError::arithmetic_overflow("add"))?;
    fix_scale(sum, scale, "add")
}

/// Subtract `right` from `left` at the given precision
pub fn subtract(
    left: Decimal,
    right: Decimal,
    precision: i32,
) -> Result<Decimal, CommissionError> {
    let scale = checked_precision(precision)?;
    let difference = left
        .checked_sub(right)
        .ok_or_else(|| CommissionError::arithmetic_overflow("subtract"))?;
    fix_scale(difference, scale, "subtract")
}

/// Multiply two values at the given precision
pub fn multiply(
    left: Decimal,
    right: Decimal,
    precision: i32,
) -> Result<Decimal, CommissionError> {
    let scale = checked_precision(precision)?;
    let product = left
        .checked_mul(right)
        .ok_or_else(|| CommissionError::arithmetic_overflow("multiply"))?;
    fix_scale(product, scale, "multiply")
}

/// Divide `left` by `right` at the given precision
///
/// Fails with `DivisionByZero` when `right` is zero once truncated to `precision`,
/// so `divide(x, 0.001, 2)` is rejected as well.
pub fn divide(left: Decimal, right: Decimal, precision: i32) -> Result<Decimal, CommissionError> {
    let scale = checked_precision(precision)?;
    if right.round_dp_with_strategy(scale, RoundingStrategy::ToZero).is_zero() {
        return Err(CommissionError::DivisionByZero);
    }
    let quotient = left
        .checked_div(right)
        .ok_or_else(|| CommissionError::arithmetic_overflow("divide"))?;
    fix_scale(quotient, scale, "divide")
}

/// Compare two values after truncating both to the given precision
pub fn compare(left: Decimal, right: Decimal, precision: i32) -> Result<Ordering, CommissionError> {
    let scale = checked_precision(precision)?;
    let left = left.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let right = right.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    Ok(left.cmp(&right))
}

/// Round up to `precision` fractional digits
///
/// Adds half a unit of the last kept digit, then rounds half toward zero. Exact
/// values are kept as they are, anything above them moves to the next unit:
/// `1.00 -> 1`, `1.001 -> 2`, `0.009 -> 0.01` at precisions 0, 0 and 2.
/// A result of negative zero is reported as zero.
pub fn round_up(value: Decimal, precision: i32) -> Result<Decimal, CommissionError> {
    let scale = checked_precision(precision)?;
    let offset = Decimal::new(5, scale + 1);
    let shifted = value
        .checked_add(offset)
        .ok_or_else(|| CommissionError::arithmetic_overflow("round_up"))?;

    pad_scale(
        shifted.round_dp_with_strategy(scale, RoundingStrategy::MidpointTowardZero),
        scale,
        "round_up",
    )
}

/// Working precision for a currency: one guard digit past its decimal places
pub fn working_precision(decimal_places: u32) -> i32 {
    decimal_places as i32 + 1
}
