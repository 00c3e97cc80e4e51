//! EMON Convertor Common Library
//!
//! Shared types, constants, and utilities for the EMON token convertor
//! and the token ledgers it settles against.
//!
//! ## Model
//!
//! The convertor is an account-model intermediary between two token ledgers:
//! - **Old token** (EMONT, 8 decimals) pulls into the convertor through
//!   approve-and-call
//! - **New token** (EMON, 18 decimals) pushes into the convertor through
//!   transfer-and-call
//! - **Reserves** of both tokens live in the ledgers, owned by the
//!   convertor address
//!
//! ## Modules
//!
//! - **Constants**: token metadata and the fixed conversion ratio
//! - **Errors**: the single error taxonomy shared by ledgers and convertor
//! - **Types**: addresses, the token pair, direction flags
//! - **Math**: checked ratio conversion between denominations
//! - **Events**: structured event log
//! - **Access Control**: single-owner capability
//! - **Ledger**: the token capability the convertor consumes
//!
//! This crate is `no_std` compatible for WASM compilation when built
//! without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod access_control;
pub mod ledger;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use access_control::*;
pub use ledger::*;
