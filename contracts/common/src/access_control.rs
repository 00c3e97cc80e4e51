//! Access Control Module
//!
//! Single-owner capability for the convertor's operator entry points.
//! The owner is checked on every configuration call and can hand the
//! capability to another principal.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{ConvertError, ConvertResult};
use crate::types::{Address, ZERO_ADDRESS};

/// Owner capability held by exactly one principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Create the capability for `owner`
    pub fn new(owner: Address) -> ConvertResult<Self> {
        if owner == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "owner cannot be the zero address",
            });
        }
        Ok(Self { owner })
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Check if address holds the capability
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owner == *address
    }

    /// Fail unless `caller` is the owner
    pub fn ensure_owner(&self, caller: &Address) -> ConvertResult<()> {
        if !self.is_owner(caller) {
            return Err(ConvertError::OwnerOnly {
                owner: self.owner,
                caller: *caller,
            });
        }
        Ok(())
    }

    /// Move the capability to `new_owner`, returning the previous owner
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> ConvertResult<Address> {
        self.ensure_owner(caller)?;

        if new_owner == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "new owner cannot be the zero address",
            });
        }

        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}
