//! Core Types for the EMON Convertor
//!
//! Addresses, the configured token pair, the direction gates and the
//! operator actions shared by the convertor and the host.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{ConvertError, ConvertResult};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Raw token amount in the token's smallest unit
pub type Amount = u128;

/// The zero address, never a valid token, owner or recipient
pub const ZERO_ADDRESS: Address = [0u8; 32];

// ============ Conversion Direction ============

/// Which way a conversion moves value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum ConversionDirection {
    /// Old token (8 decimals) to new token (18 decimals)
    Upgrade = 0,
    /// New token (18 decimals) to old token (8 decimals)
    Downgrade = 1,
}

impl ConversionDirection {
    /// The opposite direction
    pub fn reverse(&self) -> Self {
        match self {
            Self::Upgrade => Self::Downgrade,
            Self::Downgrade => Self::Upgrade,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
        }
    }
}

// ============ Token Pair ============

/// The two token contracts the convertor settles against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenAddressPair {
    /// Old token (EMONT) contract address
    pub old_token: Address,
    /// New token (EMON) contract address
    pub new_token: Address,
}

impl TokenAddressPair {
    /// Create a validated pair: both addresses non-zero and distinct
    pub fn new(old_token: Address, new_token: Address) -> ConvertResult<Self> {
        if old_token == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "old token cannot be the zero address",
            });
        }
        if new_token == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "new token cannot be the zero address",
            });
        }
        if old_token == new_token {
            return Err(ConvertError::InvalidAddress {
                reason: "old and new token must differ",
            });
        }
        Ok(Self { old_token, new_token })
    }

    /// Token paid in for a direction (the only legitimate hook caller)
    pub fn source(&self, direction: ConversionDirection) -> Address {
        match direction {
            ConversionDirection::Upgrade => self.old_token,
            ConversionDirection::Downgrade => self.new_token,
        }
    }

    /// Token paid out for a direction
    pub fn target(&self, direction: ConversionDirection) -> Address {
        self.source(direction.reverse())
    }

    /// Whether the address is one of the pair
    pub fn contains(&self, token: &Address) -> bool {
        self.old_token == *token || self.new_token == *token
    }
}

// ============ Direction Flags ============

/// Operator gates for each conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DirectionFlags {
    /// Old -> new conversions allowed
    pub upgradable: bool,
    /// New -> old conversions allowed
    pub downgradable: bool,
}

impl Default for DirectionFlags {
    fn default() -> Self {
        Self {
            upgradable: true,
            downgradable: true,
        }
    }
}

impl DirectionFlags {
    pub fn is_enabled(&self, direction: ConversionDirection) -> bool {
        match direction {
            ConversionDirection::Upgrade => self.upgradable,
            ConversionDirection::Downgrade => self.downgradable,
        }
    }

    pub fn set(&mut self, direction: ConversionDirection, enabled: bool) {
        match direction {
            ConversionDirection::Upgrade => self.upgradable = enabled,
            ConversionDirection::Downgrade => self.downgradable = enabled,
        }
    }
}

// ============ Reserves ============

/// Convertor holdings, read from the ledgers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ReserveBalances {
    /// Old token raw units held by the convertor
    pub old: Amount,
    /// New token raw units held by the convertor
    pub new: Amount,
}

// ============ Actions ============

/// Operator actions on the convertor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ConvertorAction {
    /// Set the token pair
    SetAddress { old_token: Address, new_token: Address },
    /// Toggle the old -> new direction
    SetUpgradable { enabled: bool },
    /// Toggle the new -> old direction
    SetDowngradable { enabled: bool },
    /// Hand the owner capability to another principal
    TransferOwnership { new_owner: Address },
    /// Move reserve funds of a configured token out of the convertor
    WithdrawReserve { token: Address, to: Address, amount: Amount },
}
