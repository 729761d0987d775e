//! Checked arithmetic over [`Amount`].
//!
//! Every balance and allowance mutation goes through these helpers; none of
//! them ever wraps.

use crate::types::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("division by zero")]
    DivisionByZero,
}

pub fn add(a: Amount, b: Amount) -> Result<Amount, ArithmeticError> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

pub fn sub(a: Amount, b: Amount) -> Result<Amount, ArithmeticError> {
    if b > a {
        return Err(ArithmeticError::Underflow);
    }
    Ok(a - b)
}

pub fn mul(a: Amount, b: Amount) -> Result<Amount, ArithmeticError> {
    a.checked_mul(b).ok_or(ArithmeticError::Overflow)
}

/// Floor division.
pub fn div(a: Amount, b: Amount) -> Result<Amount, ArithmeticError> {
    if b == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    Ok(a / b)
}

/// `10^decimals`, the decimal-scaled unit.
pub fn pow10(decimals: u8) -> Result<Amount, ArithmeticError> {
    (0..decimals).try_fold(1, |acc, _| mul(acc, 10))
}

/// Checked sum, used by the conservation check.
pub fn sum<I>(values: I) -> Result<Amount, ArithmeticError>
where
    I: IntoIterator<Item = Amount>,
{
    values.into_iter().try_fold(0, add)
}
