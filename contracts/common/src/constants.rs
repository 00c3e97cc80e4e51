//! Protocol Constants
//!
//! Token metadata and the fixed conversion ratio between the two EMON
//! denominations. Raw amounts are `u128` because an 18-decimal supply of
//! a few million tokens already exceeds `u64::MAX`.

/// Old token (Etheremon, pre-migration)
pub mod old_token {
    /// Token name
    pub const NAME: &str = "EtheremonToken";
    /// Token symbol
    pub const SYMBOL: &str = "EMONT";
    /// Decimal places
    pub const DECIMALS: u8 = 8;
    /// One whole token in raw units (10^8)
    pub const ONE: u128 = 100_000_000;
}

/// New token (Ethermon)
pub mod new_token {
    /// Token name
    pub const NAME: &str = "EthermonToken";
    /// Token symbol
    pub const SYMBOL: &str = "EMON";
    /// Decimal places
    pub const DECIMALS: u8 = 18;
    /// One whole token in raw units (10^18)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Conversion ratio between the denominations
pub mod conversion {
    use super::{new_token, old_token};

    /// New-token human units granted per old-token human unit
    pub const RATIO: u128 = 20;

    /// Decimal scaling from old raw units to new raw units (10^18 / 10^8)
    pub const SCALE_FACTOR: u128 = new_token::ONE / old_token::ONE;

    /// New raw units per old raw unit (RATIO * SCALE_FACTOR = 2 * 10^11).
    /// Upgrades multiply by this, downgrades divide by it.
    pub const RAW_RATE: u128 = RATIO * SCALE_FACTOR;
}
