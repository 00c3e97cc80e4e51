//! Error Types for the EMON Convertor
//!
//! One typed taxonomy shared by the token ledgers, the convertor and the
//! host. Any error reverts the whole call that produced it.

use crate::types::{Address, Amount, ConversionDirection};

/// Result type alias for convertor operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Main error enum for all convertor and ledger errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    // ============ Conversion Errors ============
    /// Hook invoked by something other than the configured token contract
    UnauthorizedCaller {
        direction: ConversionDirection,
        expected: Address,
        actual: Address,
    },

    /// Conversion direction switched off by the operator
    DirectionDisabled { direction: ConversionDirection },

    /// Convertor cannot cover the opposite side of the conversion
    InsufficientReserve { available: Amount, required: Amount },

    /// Zero amount not allowed
    ZeroAmount,

    /// Token pair has not been set yet
    NotConfigured,

    /// Token pair can no longer change after the first settled conversion
    AddressesFrozen,

    /// Hook re-entered while a conversion is in progress
    ReentrantCall,

    // ============ Authorization Errors ============
    /// Only the convertor owner can perform this action
    OwnerOnly { owner: Address, caller: Address },

    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    // ============ Ledger Errors ============
    /// Insufficient balance for a transfer
    InsufficientBalance { available: Amount, requested: Amount },

    /// Spender allowance too small for a transfer_from
    InsufficientAllowance { available: Amount, requested: Amount },

    /// No token deployed at the address
    UnknownToken { token: Address },

    /// Callback target is not a contract that accepts the hook
    NotAReceiver { address: Address },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,
}

impl ConvertError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnauthorizedCaller { .. } => "E001_UNAUTHORIZED_CALLER",
            Self::DirectionDisabled { .. } => "E002_DIRECTION_DISABLED",
            Self::InsufficientReserve { .. } => "E003_INSUFFICIENT_RESERVE",
            Self::ZeroAmount => "E004_ZERO_AMOUNT",
            Self::NotConfigured => "E005_NOT_CONFIGURED",
            Self::AddressesFrozen => "E006_ADDRESSES_FROZEN",
            Self::ReentrantCall => "E007_REENTRANT_CALL",
            Self::OwnerOnly { .. } => "E020_OWNER_ONLY",
            Self::InvalidAddress { .. } => "E021_INVALID_ADDRESS",
            Self::InsufficientBalance { .. } => "E040_INSUFFICIENT_BALANCE",
            Self::InsufficientAllowance { .. } => "E041_INSUFFICIENT_ALLOWANCE",
            Self::UnknownToken { .. } => "E042_UNKNOWN_TOKEN",
            Self::NotAReceiver { .. } => "E043_NOT_A_RECEIVER",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
        }
    }

    /// Revert reason surfaced to the caller
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnauthorizedCaller { direction: ConversionDirection::Upgrade, .. } => {
                "Must be called from Old Token Contract"
            }
            Self::UnauthorizedCaller { direction: ConversionDirection::Downgrade, .. } => {
                "Must be called from New Token Contract"
            }
            Self::DirectionDisabled { direction: ConversionDirection::Upgrade } => {
                "Upgrading is disabled"
            }
            Self::DirectionDisabled { direction: ConversionDirection::Downgrade } => {
                "Downgrading is disabled"
            }
            Self::InsufficientReserve { .. } => "Insufficient convertor reserve",
            Self::ZeroAmount => "Amount must be greater than zero",
            Self::NotConfigured => "Token addresses not set",
            Self::AddressesFrozen => "Token addresses are frozen",
            Self::ReentrantCall => "Reentrant call",
            Self::OwnerOnly { .. } => "Caller is not the owner",
            Self::InvalidAddress { reason } => *reason,
            Self::InsufficientBalance { .. } => "Transfer amount exceeds balance",
            Self::InsufficientAllowance { .. } => "Transfer amount exceeds allowance",
            Self::UnknownToken { .. } => "No token at address",
            Self::NotAReceiver { .. } => "Recipient does not accept token callbacks",
            Self::Overflow => "Arithmetic overflow",
            Self::Underflow => "Arithmetic underflow",
        }
    }

}

impl core::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            ConvertError::UnauthorizedCaller {
                direction: ConversionDirection::Upgrade,
                expected: [1u8; 32],
                actual: [2u8; 32],
            },
            ConvertError::DirectionDisabled { direction: ConversionDirection::Upgrade },
            ConvertError::InsufficientReserve { available: 0, required: 1 },
            ConvertError::ZeroAmount,
            ConvertError::NotConfigured,
            ConvertError::AddressesFrozen,
            ConvertError::ReentrantCall,
            ConvertError::OwnerOnly { owner: [1u8; 32], caller: [2u8; 32] },
            ConvertError::Overflow,
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_direction_messages() {
        let up = ConvertError::DirectionDisabled { direction: ConversionDirection::Upgrade };
        let down = ConvertError::DirectionDisabled { direction: ConversionDirection::Downgrade };
        assert_eq!(up.message(), "Upgrading is disabled");
        assert_eq!(down.message(), "Downgrading is disabled");
    }
}
