//! Conversion Math
//!
//! Checked fixed-point conversion between the old (8-decimal) and new
//! (18-decimal) denominations. Upgrades are exact; downgrades truncate
//! toward zero and the remainder stays with the convertor.

use crate::constants::conversion::RAW_RATE;
use crate::errors::{ConvertError, ConvertResult};
use crate::types::{Amount, ConversionDirection};

/// Output of a conversion before it is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Raw units paid in
    pub amount_in: Amount,
    /// Raw units paid out
    pub amount_out: Amount,
    /// Input raw units that bought nothing (always zero for upgrades)
    pub dust: Amount,
}

/// Old raw units to new raw units
///
/// new_raw = old_raw * RATIO * 10^10
pub fn upgrade_amount(old_raw: Amount) -> ConvertResult<Amount> {
    old_raw.checked_mul(RAW_RATE).ok_or(ConvertError::Overflow)
}

/// New raw units to old raw units, truncating
///
/// old_raw = new_raw / 10^10 / RATIO
pub fn downgrade_amount(new_raw: Amount) -> Amount {
    new_raw / RAW_RATE
}

/// New raw units a downgrade leaves behind in the reserve
pub fn downgrade_dust(new_raw: Amount) -> Amount {
    new_raw % RAW_RATE
}

/// Quote a conversion in either direction
pub fn quote(direction: ConversionDirection, amount_in: Amount) -> ConvertResult<Quote> {
    match direction {
        ConversionDirection::Upgrade => Ok(Quote {
            amount_in,
            amount_out: upgrade_amount(amount_in)?,
            dust: 0,
        }),
        ConversionDirection::Downgrade => Ok(Quote {
            amount_in,
            amount_out: downgrade_amount(amount_in),
            dust: downgrade_dust(amount_in),
        }),
    }
}

/// Safe addition with overflow check
pub fn safe_add(a: Amount, b: Amount) -> ConvertResult<Amount> {
    a.checked_add(b).ok_or(ConvertError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: Amount, b: Amount) -> ConvertResult<Amount> {
    a.checked_sub(b).ok_or(ConvertError::Underflow)
}
