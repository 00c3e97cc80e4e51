//! Ledger Capability
//!
//! The slice of the token contracts the convertor consumes. Balance and
//! allowance bookkeeping belong to the ledgers; the convertor only reads
//! balances and moves funds through these calls.

use crate::errors::ConvertResult;
use crate::types::{Address, Amount};

/// Token ledgers addressable by contract address
pub trait TokenLedgers {
    /// Balance of `owner` on `token`
    fn balance_of(&self, token: &Address, owner: &Address) -> ConvertResult<Amount>;

    /// Move `amount` of `token` from `from` (the acting principal) to `to`
    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> ConvertResult<()>;

    /// Move `amount` of `token` from `from` to `to`, consuming the
    /// allowance `from` granted to `spender`
    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> ConvertResult<()>;
}
