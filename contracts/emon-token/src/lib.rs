//! EMON Token Ledger
//!
//! Account-model fungible token used for both denominations the convertor
//! settles against: EMONT (8 decimals) and EMON (18 decimals).
//!
//! The ledger only does standard bookkeeping: balances, allowances,
//! transfers. The hook primitives (approve-and-call, transfer-and-call)
//! need the receiving contract and are driven by the host, which calls
//! into this ledger for the balance movements.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::trace;

use emon_common::{
    constants::{new_token, old_token},
    errors::{ConvertError, ConvertResult},
    events::{ConvertorEvent, EventLog},
    ledger::TokenLedgers,
    math::{safe_add, safe_sub},
    types::{Address, Amount, ZERO_ADDRESS},
};

// ============ Token Metadata ============

/// Static description of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Etheremon token (pre-migration, 8 decimals)
    pub fn old_token() -> Self {
        Self::new(old_token::NAME, old_token::SYMBOL, old_token::DECIMALS)
    }

    /// Ethermon token (18 decimals)
    pub fn new_token() -> Self {
        Self::new(new_token::NAME, new_token::SYMBOL, new_token::DECIMALS)
    }
}

// ============ Token State ============

/// Ledger of a single token contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenState {
    /// Contract address
    pub address: Address,
    /// Name, symbol, decimals
    pub metadata: TokenMetadata,
    /// Total supply in raw units
    pub total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: BTreeMap<(Address, Address), Amount>,
}

// NOTE: Default trait intentionally NOT implemented; a ledger without a
// contract address cannot be addressed by hooks.

impl TokenState {
    /// Create an empty ledger
    pub fn new(address: Address, metadata: TokenMetadata) -> Self {
        Self {
            address,
            metadata,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// Create a ledger with its whole supply minted to `allocations`
    pub fn with_allocations(
        address: Address,
        metadata: TokenMetadata,
        allocations: &[(Address, Amount)],
    ) -> ConvertResult<Self> {
        let mut state = Self::new(address, metadata);
        for (holder, amount) in allocations {
            if *holder == ZERO_ADDRESS {
                return Err(ConvertError::InvalidAddress {
                    reason: "cannot allocate to the zero address",
                });
            }
            state.total_supply = safe_add(state.total_supply, *amount)?;
            let balance = state.balance_of(holder);
            state.balances.insert(*holder, safe_add(balance, *amount)?);
        }
        Ok(state)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// Balance of `owner` in raw units
    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may move out of `owner`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        events: &mut EventLog,
        block_height: u64,
    ) -> ConvertResult<()> {
        trace!(token = %self.metadata.symbol, amount, "transferring");

        // 1. Recipient must exist
        if *to == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "cannot transfer to the zero address",
            });
        }

        // 2. Sender must have enough balance
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(ConvertError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            });
        }

        // 3. Debit then credit (same account nets to zero)
        self.balances.insert(*from, safe_sub(from_balance, amount)?);
        let to_balance = self.balance_of(to);
        self.balances.insert(*to, safe_add(to_balance, amount)?);

        // 4. Emit transfer event
        events.emit(ConvertorEvent::Transfer {
            token: self.address,
            from: *from,
            to: *to,
            amount,
            block_height,
        });

        Ok(())
    }

    /// Record that `spender` may move up to `amount` out of `owner`
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
        events: &mut EventLog,
        block_height: u64,
    ) -> ConvertResult<()> {
        trace!(token = %self.metadata.symbol, amount, "approving");

        if *spender == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "cannot approve the zero address",
            });
        }

        self.allowances.insert((*owner, *spender), amount);

        events.emit(ConvertorEvent::Approval {
            token: self.address,
            owner: *owner,
            spender: *spender,
            amount,
            block_height,
        });

        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
        events: &mut EventLog,
        block_height: u64,
    ) -> ConvertResult<()> {
        // 1. Spender must be allowed
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(ConvertError::InsufficientAllowance {
                available: allowed,
                requested: amount,
            });
        }

        // 2. Move the funds
        self.transfer(from, to, amount, events, block_height)?;

        // 3. Consume the allowance
        self.allowances.insert((*from, *spender), safe_sub(allowed, amount)?);

        Ok(())
    }
}

// ============ Token Registry ============

/// Every deployed token ledger, keyed by contract address
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<Address, TokenState>,
    /// Chain-wide event log
    pub events: EventLog,
    /// Height stamped on emitted events
    pub block_height: u64,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deployed token
    pub fn register(&mut self, token: TokenState) -> ConvertResult<()> {
        if token.address == ZERO_ADDRESS || self.tokens.contains_key(&token.address) {
            return Err(ConvertError::InvalidAddress {
                reason: "token address already in use",
            });
        }
        self.tokens.insert(token.address, token);
        Ok(())
    }

    pub fn get(&self, token: &Address) -> ConvertResult<&TokenState> {
        self.tokens
            .get(token)
            .ok_or(ConvertError::UnknownToken { token: *token })
    }

    /// Record an allowance on `token`
    pub fn approve(
        &mut self,
        token: &Address,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        let block_height = self.block_height;
        let state = self
            .tokens
            .get_mut(token)
            .ok_or(ConvertError::UnknownToken { token: *token })?;
        state.approve(owner, spender, amount, &mut self.events, block_height)
    }
}

impl TokenLedgers for TokenRegistry {
    fn balance_of(&self, token: &Address, owner: &Address) -> ConvertResult<Amount> {
        Ok(self.get(token)?.balance_of(owner))
    }

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        let block_height = self.block_height;
        let state = self
            .tokens
            .get_mut(token)
            .ok_or(ConvertError::UnknownToken { token: *token })?;
        state.transfer(from, to, amount, &mut self.events, block_height)
    }

    fn transfer_from(
        &mut self,
        token: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        let block_height = self.block_height;
        let state = self
            .tokens
            .get_mut(token)
            .ok_or(ConvertError::UnknownToken { token: *token })?;
        state.transfer_from(spender, from, to, amount, &mut self.events, block_height)
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use emon_common::events::EventType;

    const TOKEN: Address = [7u8; 32];

    fn alice() -> Address {
        [1u8; 32]
    }

    fn bob() -> Address {
        [2u8; 32]
    }

    fn create_test_token() -> TokenState {
        TokenState::with_allocations(
            TOKEN,
            TokenMetadata::old_token(),
            &[(alice(), 1000), (bob(), 500)],
        )
        .unwrap()
    }

    #[test]
    fn test_metadata() {
        let token = create_test_token();
        assert_eq!(token.name(), "EtheremonToken");
        assert_eq!(token.symbol(), "EMONT");
        assert_eq!(token.decimals(), 8);
        assert_eq!(TokenMetadata::new_token().decimals, 18);
    }

    #[test]
    fn test_allocations() {
        let token = create_test_token();
        assert_eq!(token.total_supply, 1500);
        assert_eq!(token.balance_of(&alice()), 1000);
        assert_eq!(token.balance_of(&[3u8; 32]), 0);
    }

    #[test]
    fn test_allocation_to_zero_rejected() {
        let result = TokenState::with_allocations(
            TOKEN,
            TokenMetadata::old_token(),
            &[(ZERO_ADDRESS, 1)],
        );
        assert!(matches!(result, Err(ConvertError::InvalidAddress { .. })));
    }

    #[test]
    fn test_transfer_success() {
        let mut token = create_test_token();
        let mut events = EventLog::new();

        token.transfer(&alice(), &bob(), 600, &mut events, 10).unwrap();

        assert_eq!(token.balance_of(&alice()), 400);
        assert_eq!(token.balance_of(&bob()), 1100);
        assert_eq!(token.total_supply, 1500);
        assert_eq!(events.filter_by_type(EventType::Transfer).len(), 1);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut token = create_test_token();
        let mut events = EventLog::new();

        let result = token.transfer(&bob(), &alice(), 501, &mut events, 10);
        assert_eq!(
            result,
            Err(ConvertError::InsufficientBalance { available: 500, requested: 501 })
        );
        assert!(!events.has_events());
    }

    #[test]
    fn test_transfer_to_self_keeps_balance() {
        let mut token = create_test_token();
        let mut events = EventLog::new();

        token.transfer(&alice(), &alice(), 1000, &mut events, 10).unwrap();
        assert_eq!(token.balance_of(&alice()), 1000);
    }

    #[test]
    fn test_zero_value_transfer_allowed() {
        let mut token = create_test_token();
        let mut events = EventLog::new();

        token.transfer(&alice(), &bob(), 0, &mut events, 10).unwrap();
        assert_eq!(token.balance_of(&bob()), 500);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut token = create_test_token();
        let mut events = EventLog::new();
        let spender = [9u8; 32];

        token.approve(&alice(), &spender, 300, &mut events, 10).unwrap();
        token.transfer_from(&spender, &alice(), &bob(), 200, &mut events, 11).unwrap();

        assert_eq!(token.allowance(&alice(), &spender), 100);
        assert_eq!(token.balance_of(&bob()), 700);

        let result = token.transfer_from(&spender, &alice(), &bob(), 101, &mut events, 12);
        assert_eq!(
            result,
            Err(ConvertError::InsufficientAllowance { available: 100, requested: 101 })
        );
    }

    #[test]
    fn test_registry_routes_by_address() {
        let mut registry = TokenRegistry::new();
        registry.register(create_test_token()).unwrap();

        // Duplicate address
        assert!(registry.register(create_test_token()).is_err());

        registry.block_height = 42;
        registry.transfer(&TOKEN, &alice(), &bob(), 10).unwrap();
        assert_eq!(registry.balance_of(&TOKEN, &bob()).unwrap(), 510);
        assert_eq!(registry.events.last().unwrap().block_height(), 42);

        let unknown = [8u8; 32];
        assert_eq!(
            registry.balance_of(&unknown, &bob()),
            Err(ConvertError::UnknownToken { token: unknown })
        );
    }
}
