//! EMON Token Convertor
//!
//! Two-way convertor between the old EMONT token (8 decimals) and the new
//! EMON token (18 decimals) at a fixed 1:20 ratio.
//!
//! ## Hook-Based Settlement
//!
//! The convertor holds no ledger of its own. It custodies reserves of both
//! tokens (owned by its address on the token ledgers) and converts when a
//! token contract calls one of its hooks:
//!
//! ```text
//! Upgrade (pull):
//!   user --approve_and_call--> EMONT --receive_approval--> Convertor
//!   Convertor: transfer_from(EMONT, user -> convertor, amount)
//!              transfer(EMON, convertor -> user, amount * 20 * 10^10)
//!
//! Downgrade (push):
//!   user --transfer_and_call--> EMON (credits convertor) --convert_to_old--> Convertor
//!   Convertor: transfer(EMONT, convertor -> user, amount / 10^10 / 20)
//! ```
//!
//! Each conversion runs the same pipeline:
//! `Received -> Authenticated -> DirectionChecked -> AmountConverted -> Settled`.
//! Any failed step reverts the whole call.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub mod host;


use emon_common::{
    access_control::Ownable,
    errors::{ConvertError, ConvertResult},
    events::{ConvertorEvent, EventLog},
    ledger::TokenLedgers,
    math::{self, safe_add, Quote},
    types::{
        Address, Amount, ConversionDirection, ConvertorAction, DirectionFlags,
        ReserveBalances, TokenAddressPair, ZERO_ADDRESS,
    },
};

// ============ Convertor State ============

/// Persisted convertor configuration and counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ConvertorState {
    /// Operator capability
    pub owner: Ownable,
    /// Token pair, unset until the operator configures it
    pub tokens: Option<TokenAddressPair>,
    /// Direction gates
    pub flags: DirectionFlags,
    /// Set by the first settled conversion; the pair is immutable after
    pub addresses_frozen: bool,
    /// Old raw units converted to new, cumulative
    pub total_upgraded: Amount,
    /// New raw units converted to old, cumulative
    pub total_downgraded: Amount,
}

// NOTE: Default trait intentionally NOT implemented to force explicit
// initialization with a real owner.

impl ConvertorState {
    /// Fresh state owned by `owner`, both directions open
    pub fn new(owner: Address) -> ConvertResult<Self> {
        Ok(Self {
            owner: Ownable::new(owner)?,
            tokens: None,
            flags: DirectionFlags::default(),
            addresses_frozen: false,
            total_upgraded: 0,
            total_downgraded: 0,
        })
    }

    /// Configured token pair
    pub fn token_pair(&self) -> ConvertResult<TokenAddressPair> {
        self.tokens.ok_or(ConvertError::NotConfigured)
    }

    /// Serialize state to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize state from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

// ============ Call Context ============

/// Everything a single call sees: who invoked it and the ledgers it may touch
pub struct CallContext<'a, L: TokenLedgers + ?Sized> {
    /// Immediate invoker (a token contract for hooks, a user for operator calls)
    pub caller: Address,
    /// Current block height
    pub block_height: u64,
    /// Token ledgers holding the reserves
    pub ledgers: &'a mut L,
    /// Event log for emitting events
    pub events: &'a mut EventLog,
}

// ============ Conversion Types ============

/// A conversion as received from a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    pub direction: ConversionDirection,
    /// Account paying in and receiving the output
    pub account: Address,
    /// Raw units of the source token
    pub amount: Amount,
}

/// A settled conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Conversion {
    pub direction: ConversionDirection,
    pub account: Address,
    /// Raw units of the source token taken from the account
    pub amount_in: Amount,
    /// Raw units of the target token released to the account
    pub amount_out: Amount,
    /// Source raw units kept by the reserve without output
    pub dust: Amount,
}

// ============ Convertor ============

/// The conversion controller deployed at `address`
#[derive(Debug, Clone)]
pub struct TokenConvertor {
    /// Contract address (owns the reserves on both ledgers)
    pub address: Address,
    /// Persisted state
    pub state: ConvertorState,
    /// Reentrancy guard, held while a conversion settles
    entered: bool,
}

impl TokenConvertor {
    /// Deploy a convertor at `address` operated by `owner`
    pub fn new(address: Address, owner: Address) -> ConvertResult<Self> {
        if address == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "convertor cannot live at the zero address",
            });
        }
        Ok(Self::from_state(address, ConvertorState::new(owner)?))
    }

    /// Restore a convertor from persisted state
    pub fn from_state(address: Address, state: ConvertorState) -> Self {
        Self {
            address,
            state,
            entered: false,
        }
    }

    pub fn owner(&self) -> Address {
        self.state.owner.owner()
    }

    pub fn is_upgradable(&self) -> bool {
        self.state.flags.upgradable
    }

    pub fn is_downgradable(&self) -> bool {
        self.state.flags.downgradable
    }

    // ============ Operator Entry Points ============

    /// Dispatch an operator action
    pub fn execute<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        action: &ConvertorAction,
    ) -> ConvertResult<()> {
        match action {
            ConvertorAction::SetAddress { old_token, new_token } => {
                self.set_address(ctx, *old_token, *new_token)
            }
            ConvertorAction::SetUpgradable { enabled } => self.set_upgradable(ctx, *enabled),
            ConvertorAction::SetDowngradable { enabled } => self.set_downgradable(ctx, *enabled),
            ConvertorAction::TransferOwnership { new_owner } => {
                self.transfer_ownership(ctx, *new_owner)
            }
            ConvertorAction::WithdrawReserve { token, to, amount } => {
                self.withdraw_reserve(ctx, *token, *to, *amount)
            }
        }
    }

    /// Set the token pair. Allowed until the first conversion settles.
    pub fn set_address<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        old_token: Address,
        new_token: Address,
    ) -> ConvertResult<()> {
        // 1. Operator only
        self.state.owner.ensure_owner(&ctx.caller)?;

        // 2. Pair is frozen once value has moved through it
        if self.state.addresses_frozen {
            return Err(ConvertError::AddressesFrozen);
        }

        // 3. Validate and store
        let pair = TokenAddressPair::new(old_token, new_token)?;
        self.state.tokens = Some(pair);

        ctx.events.emit(ConvertorEvent::AddressesSet {
            old_token,
            new_token,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Open or close the old -> new direction
    pub fn set_upgradable<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        enabled: bool,
    ) -> ConvertResult<()> {
        self.set_direction(ctx, ConversionDirection::Upgrade, enabled)
    }

    /// Open or close the new -> old direction
    pub fn set_downgradable<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        enabled: bool,
    ) -> ConvertResult<()> {
        self.set_direction(ctx, ConversionDirection::Downgrade, enabled)
    }

    fn set_direction<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        direction: ConversionDirection,
        enabled: bool,
    ) -> ConvertResult<()> {
        self.state.owner.ensure_owner(&ctx.caller)?;
        self.state.flags.set(direction, enabled);

        debug!(direction = direction.label(), enabled, "direction gate changed");
        ctx.events.emit(ConvertorEvent::DirectionToggled {
            direction,
            enabled,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Hand the operator capability to `new_owner`
    pub fn transfer_ownership<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        new_owner: Address,
    ) -> ConvertResult<()> {
        let previous_owner = self.state.owner.transfer_ownership(&ctx.caller, new_owner)?;

        ctx.events.emit(ConvertorEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    /// Move reserve funds of a configured token to `to`
    pub fn withdraw_reserve<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        // 1. Operator only
        self.state.owner.ensure_owner(&ctx.caller)?;

        // 2. Only the pair's reserves are managed here
        let pair = self.state.token_pair()?;
        if !pair.contains(&token) {
            return Err(ConvertError::UnknownToken { token });
        }

        // 3. Amount must be positive and covered
        if amount == 0 {
            return Err(ConvertError::ZeroAmount);
        }
        let available = ctx.ledgers.balance_of(&token, &self.address)?;
        if available < amount {
            return Err(ConvertError::InsufficientReserve {
                available,
                required: amount,
            });
        }

        // 4. Release
        ctx.ledgers.transfer(&token, &self.address, &to, amount)?;

        ctx.events.emit(ConvertorEvent::ReserveWithdrawn {
            token,
            to,
            amount,
            block_height: ctx.block_height,
        });

        Ok(())
    }

    // ============ Token Hooks ============

    /// Upgrade hook, called by the old token's approve-and-call after it
    /// recorded an allowance of `amount` from `from` to this convertor.
    ///
    /// `token` must name the calling contract. `data` is accepted for
    /// interface compatibility and not interpreted.
    pub fn receive_approval<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        from: Address,
        amount: Amount,
        token: Address,
        _data: &[u8],
    ) -> ConvertResult<Conversion> {
        let pair = self.authenticate(ctx, ConversionDirection::Upgrade)?;
        if token != pair.old_token {
            return Err(ConvertError::UnauthorizedCaller {
                direction: ConversionDirection::Upgrade,
                expected: pair.old_token,
                actual: token,
            });
        }

        self.convert(
            ctx,
            ConversionRequest {
                direction: ConversionDirection::Upgrade,
                account: from,
                amount,
            },
        )
    }

    /// Downgrade hook, called by the new token's transfer-and-call after it
    /// credited `amount` to this convertor on behalf of `beneficiary`.
    pub fn convert_to_old<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        amount: Amount,
        beneficiary: Address,
    ) -> ConvertResult<Conversion> {
        self.convert(
            ctx,
            ConversionRequest {
                direction: ConversionDirection::Downgrade,
                account: beneficiary,
                amount,
            },
        )
    }

    // ============ Conversion Pipeline ============

    /// Single validated entry for both directions
    pub fn convert<L: TokenLedgers + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, L>,
        request: ConversionRequest,
    ) -> ConvertResult<Conversion> {
        trace!(direction = request.direction.label(), amount = request.amount, "conversion received");

        if self.entered {
            return Err(ConvertError::ReentrantCall);
        }

        // 1. Authenticated: the invoker is the source token itself
        let pair = self.authenticate(ctx, request.direction)?;

        // 2. DirectionChecked
        if !self.state.flags.is_enabled(request.direction) {
            return Err(ConvertError::DirectionDisabled {
                direction: request.direction,
            });
        }

        // 3. AmountConverted
        if request.amount == 0 {
            return Err(ConvertError::ZeroAmount);
        }
        if request.account == ZERO_ADDRESS {
            return Err(ConvertError::InvalidAddress {
                reason: "cannot convert for the zero address",
            });
        }
        let quote = math::quote(request.direction, request.amount)?;

        // 4. Reserve must cover the payout before anything moves
        let target = pair.target(request.direction);
        let available = ctx.ledgers.balance_of(&target, &self.address)?;
        if available < quote.amount_out {
            return Err(ConvertError::InsufficientReserve {
                available,
                required: quote.amount_out,
            });
        }

        // 5. Effects, then interactions under the guard
        let previous = self.state.clone();
        self.record(request.direction, request.amount)?;

        self.entered = true;
        let settled = self.settle(ctx, &pair, &request, &quote);
        self.entered = false;

        if let Err(err) = settled {
            self.state = previous;
            return Err(err);
        }

        // 6. Settled
        let conversion = Conversion {
            direction: request.direction,
            account: request.account,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            dust: quote.dust,
        };
        self.emit_conversion(ctx, &conversion);

        debug!(
            direction = conversion.direction.label(),
            amount_in = conversion.amount_in,
            amount_out = conversion.amount_out,
            "conversion settled"
        );

        Ok(conversion)
    }

    /// Check the pair is configured and the invoker is the direction's source token
    fn authenticate<L: TokenLedgers + ?Sized>(
        &self,
        ctx: &CallContext<'_, L>,
        direction: ConversionDirection,
    ) -> ConvertResult<TokenAddressPair> {
        let pair = self.state.token_pair()?;
        let expected = pair.source(direction);
        if ctx.caller != expected {
            return Err(ConvertError::UnauthorizedCaller {
                direction,
                expected,
                actual: ctx.caller,
            });
        }
        Ok(pair)
    }

    /// Freeze the pair and bump the counters
    fn record(&mut self, direction: ConversionDirection, amount: Amount) -> ConvertResult<()> {
        match direction {
            ConversionDirection::Upgrade => {
                self.state.total_upgraded = safe_add(self.state.total_upgraded, amount)?;
            }
            ConversionDirection::Downgrade => {
                self.state.total_downgraded = safe_add(self.state.total_downgraded, amount)?;
            }
        }
        self.state.addresses_frozen = true;
        Ok(())
    }

    fn settle<L: TokenLedgers + ?Sized>(
        &self,
        ctx: &mut CallContext<'_, L>,
        pair: &TokenAddressPair,
        request: &ConversionRequest,
        quote: &Quote,
    ) -> ConvertResult<()> {
        match request.direction {
            ConversionDirection::Upgrade => {
                // Pull the old tokens through the allowance just granted
                ctx.ledgers.transfer_from(
                    &pair.old_token,
                    &self.address,
                    &request.account,
                    &self.address,
                    quote.amount_in,
                )?;
                ctx.ledgers.transfer(
                    &pair.new_token,
                    &self.address,
                    &request.account,
                    quote.amount_out,
                )
            }
            ConversionDirection::Downgrade => {
                // New tokens were pushed before the hook ran
                ctx.ledgers.transfer(
                    &pair.old_token,
                    &self.address,
                    &request.account,
                    quote.amount_out,
                )
            }
        }
    }

    fn emit_conversion<L: TokenLedgers + ?Sized>(
        &self,
        ctx: &mut CallContext<'_, L>,
        conversion: &Conversion,
    ) {
        let event = match conversion.direction {
            ConversionDirection::Upgrade => ConvertorEvent::Upgraded {
                account: conversion.account,
                old_amount: conversion.amount_in,
                new_amount: conversion.amount_out,
                block_height: ctx.block_height,
            },
            ConversionDirection::Downgrade => ConvertorEvent::Downgraded {
                account: conversion.account,
                new_amount: conversion.amount_in,
                old_amount: conversion.amount_out,
                dust: conversion.dust,
                block_height: ctx.block_height,
            },
        };
        ctx.events.emit(event);
    }

    // ============ Views ============

    /// Quote a conversion without touching any state
    pub fn quote(&self, direction: ConversionDirection, amount: Amount) -> ConvertResult<Quote> {
        math::quote(direction, amount)
    }

    /// Current holdings of both tokens
    pub fn reserves<L: TokenLedgers + ?Sized>(&self, ledgers: &L) -> ConvertResult<ReserveBalances> {
        let pair = self.state.token_pair()?;
        Ok(ReserveBalances {
            old: ledgers.balance_of(&pair.old_token, &self.address)?,
            new: ledgers.balance_of(&pair.new_token, &self.address)?,
        })
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use emon_common::constants::conversion::RAW_RATE;
    use emon_token::{TokenMetadata, TokenRegistry, TokenState};

    const CONVERTOR: Address = [0xC0; 32];
    const OLD: Address = [0x01; 32];
    const NEW: Address = [0x02; 32];

    fn owner() -> Address {
        [0xAA; 32]
    }

    fn user() -> Address {
        [0xBB; 32]
    }

    fn setup() -> (TokenConvertor, TokenRegistry) {
        let mut registry = TokenRegistry::new();
        registry
            .register(
                TokenState::with_allocations(
                    OLD,
                    TokenMetadata::old_token(),
                    &[(CONVERTOR, 1_000), (user(), 1_000)],
                )
                .unwrap(),
            )
            .unwrap();
        registry
            .register(
                TokenState::with_allocations(
                    NEW,
                    TokenMetadata::new_token(),
                    &[(CONVERTOR, 1_000 * RAW_RATE), (user(), 1_000 * RAW_RATE)],
                )
                .unwrap(),
            )
            .unwrap();

        let mut convertor = TokenConvertor::new(CONVERTOR, owner()).unwrap();
        let mut events = EventLog::new();
        let mut ctx = CallContext {
            caller: owner(),
            block_height: 1,
            ledgers: &mut registry,
            events: &mut events,
        };
        convertor.set_address(&mut ctx, OLD, NEW).unwrap();

        (convertor, registry)
    }

    fn ctx<'a>(
        caller: Address,
        registry: &'a mut TokenRegistry,
        events: &'a mut EventLog,
    ) -> CallContext<'a, TokenRegistry> {
        CallContext {
            caller,
            block_height: 2,
            ledgers: registry,
            events,
        }
    }

    #[test]
    fn test_new_state_defaults() {
        let state = ConvertorState::new(owner()).unwrap();
        assert!(state.flags.upgradable);
        assert!(state.flags.downgradable);
        assert_eq!(state.tokens, None);
        assert!(ConvertorState::new(ZERO_ADDRESS).is_err());
    }

    #[test]
    fn test_state_bytes() {
        let (convertor, _) = setup();
        let bytes = convertor.state.to_bytes();
        assert_eq!(ConvertorState::from_bytes(&bytes), Some(convertor.state.clone()));
    }

    #[test]
    fn test_unconfigured_rejects_conversion() {
        let mut registry = TokenRegistry::new();
        let mut events = EventLog::new();
        let mut convertor = TokenConvertor::new(CONVERTOR, owner()).unwrap();

        let result = convertor.convert_to_old(&mut ctx(NEW, &mut registry, &mut events), 1, user());
        assert_eq!(result, Err(ConvertError::NotConfigured));
    }

    #[test]
    fn test_set_address_owner_only() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        let result = convertor.set_address(&mut ctx(user(), &mut registry, &mut events), OLD, NEW);
        assert!(matches!(result, Err(ConvertError::OwnerOnly { .. })));
    }

    #[test]
    fn test_set_address_repeatable_until_first_conversion() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        // Re-setting before go-live is fine
        convertor
            .set_address(&mut ctx(owner(), &mut registry, &mut events), OLD, NEW)
            .unwrap();

        registry.approve(&OLD, &user(), &CONVERTOR, 10).unwrap();
        convertor
            .receive_approval(&mut ctx(OLD, &mut registry, &mut events), user(), 10, OLD, &[])
            .unwrap();
        assert!(convertor.state.addresses_frozen);

        let result = convertor.set_address(&mut ctx(owner(), &mut registry, &mut events), NEW, OLD);
        assert_eq!(result, Err(ConvertError::AddressesFrozen));
    }

    #[test]
    fn test_upgrade_moves_both_sides() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        registry.approve(&OLD, &user(), &CONVERTOR, 100).unwrap();
        let conversion = convertor
            .receive_approval(&mut ctx(OLD, &mut registry, &mut events), user(), 100, OLD, &[])
            .unwrap();

        assert_eq!(conversion.amount_out, 100 * RAW_RATE);
        assert_eq!(registry.balance_of(&OLD, &user()).unwrap(), 900);
        assert_eq!(registry.balance_of(&NEW, &user()).unwrap(), 1_100 * RAW_RATE);
        assert_eq!(registry.balance_of(&OLD, &CONVERTOR).unwrap(), 1_100);
        assert_eq!(registry.balance_of(&NEW, &CONVERTOR).unwrap(), 900 * RAW_RATE);
        assert_eq!(registry.get(&OLD).unwrap().allowance(&user(), &CONVERTOR), 0);
        assert_eq!(convertor.state.total_upgraded, 100);
        assert!(matches!(events.last(), Some(ConvertorEvent::Upgraded { .. })));
    }

    #[test]
    fn test_upgrade_token_argument_must_match() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        registry.approve(&OLD, &user(), &CONVERTOR, 100).unwrap();
        let result = convertor.receive_approval(
            &mut ctx(OLD, &mut registry, &mut events),
            user(),
            100,
            NEW,
            &[],
        );
        assert!(matches!(result, Err(ConvertError::UnauthorizedCaller { .. })));
    }

    #[test]
    fn test_upgrade_insufficient_reserve_leaves_state() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        // Reserve holds exactly 1_000 * RAW_RATE new
        registry.approve(&OLD, &user(), &CONVERTOR, 1_001).unwrap();
        convertor
            .receive_approval(&mut ctx(OLD, &mut registry, &mut events), user(), 1_000, OLD, &[])
            .unwrap();

        let before = convertor.state.clone();
        let result = convertor.receive_approval(
            &mut ctx(OLD, &mut registry, &mut events),
            user(),
            1,
            OLD,
            &[],
        );
        assert_eq!(
            result,
            Err(ConvertError::InsufficientReserve { available: 0, required: RAW_RATE })
        );
        assert_eq!(convertor.state, before);
        assert_eq!(registry.get(&OLD).unwrap().allowance(&user(), &CONVERTOR), 1);
    }

    #[test]
    fn test_failed_settlement_restores_state() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        // No allowance granted, the pull fails after the reserve check
        let result = convertor.receive_approval(
            &mut ctx(OLD, &mut registry, &mut events),
            user(),
            10,
            OLD,
            &[],
        );
        assert!(matches!(result, Err(ConvertError::InsufficientAllowance { .. })));
        assert!(!convertor.state.addresses_frozen);
        assert_eq!(convertor.state.total_upgraded, 0);
        assert!(!convertor.entered);
    }

    #[test]
    fn test_downgrade_truncates_to_reserve() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        // Push first, as transfer-and-call does
        let amount = 3 * RAW_RATE + 99;
        registry.transfer(&NEW, &user(), &CONVERTOR, amount).unwrap();
        let conversion = convertor
            .convert_to_old(&mut ctx(NEW, &mut registry, &mut events), amount, user())
            .unwrap();

        assert_eq!(conversion.amount_out, 3);
        assert_eq!(conversion.dust, 99);
        assert_eq!(registry.balance_of(&OLD, &user()).unwrap(), 1_003);
        assert_eq!(registry.balance_of(&NEW, &CONVERTOR).unwrap(), 1_003 * RAW_RATE + 99);
    }

    #[test]
    fn test_direction_gates_are_independent() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        convertor
            .set_downgradable(&mut ctx(owner(), &mut registry, &mut events), false)
            .unwrap();

        let result = convertor.convert_to_old(&mut ctx(NEW, &mut registry, &mut events), RAW_RATE, user());
        assert_eq!(
            result,
            Err(ConvertError::DirectionDisabled { direction: ConversionDirection::Downgrade })
        );

        registry.approve(&OLD, &user(), &CONVERTOR, 1).unwrap();
        assert!(convertor
            .receive_approval(&mut ctx(OLD, &mut registry, &mut events), user(), 1, OLD, &[])
            .is_ok());
    }

    #[test]
    fn test_caller_checked_before_gate() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        convertor
            .set_upgradable(&mut ctx(owner(), &mut registry, &mut events), false)
            .unwrap();

        let result = convertor.receive_approval(
            &mut ctx(user(), &mut registry, &mut events),
            user(),
            1,
            OLD,
            &[],
        );
        assert!(matches!(result, Err(ConvertError::UnauthorizedCaller { .. })));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        let result = convertor.convert_to_old(&mut ctx(NEW, &mut registry, &mut events), 0, user());
        assert_eq!(result, Err(ConvertError::ZeroAmount));
    }

    #[test]
    fn test_reentrant_call_rejected() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        convertor.entered = true;
        let result = convertor.convert_to_old(&mut ctx(NEW, &mut registry, &mut events), RAW_RATE, user());
        assert_eq!(result, Err(ConvertError::ReentrantCall));
    }

    #[test]
    fn test_withdraw_reserve() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        let result = convertor.withdraw_reserve(
            &mut ctx(user(), &mut registry, &mut events),
            OLD,
            user(),
            10,
        );
        assert!(matches!(result, Err(ConvertError::OwnerOnly { .. })));

        let result = convertor.withdraw_reserve(
            &mut ctx(owner(), &mut registry, &mut events),
            OLD,
            owner(),
            1_001,
        );
        assert!(matches!(result, Err(ConvertError::InsufficientReserve { .. })));

        let stranger_token = [0x33; 32];
        let result = convertor.withdraw_reserve(
            &mut ctx(owner(), &mut registry, &mut events),
            stranger_token,
            owner(),
            1,
        );
        assert_eq!(result, Err(ConvertError::UnknownToken { token: stranger_token }));

        convertor
            .withdraw_reserve(&mut ctx(owner(), &mut registry, &mut events), OLD, owner(), 400)
            .unwrap();
        assert_eq!(convertor.reserves(&registry).unwrap().old, 600);
        assert_eq!(registry.balance_of(&OLD, &owner()).unwrap(), 400);
    }

    #[test]
    fn test_execute_dispatches_actions() {
        let (mut convertor, mut registry) = setup();
        let mut events = EventLog::new();

        convertor
            .execute(
                &mut ctx(owner(), &mut registry, &mut events),
                &ConvertorAction::SetUpgradable { enabled: false },
            )
            .unwrap();
        assert!(!convertor.is_upgradable());

        convertor
            .execute(
                &mut ctx(owner(), &mut registry, &mut events),
                &ConvertorAction::TransferOwnership { new_owner: user() },
            )
            .unwrap();
        assert_eq!(convertor.owner(), user());

        let result = convertor.execute(
            &mut ctx(owner(), &mut registry, &mut events),
            &ConvertorAction::SetDowngradable { enabled: false },
        );
        assert!(matches!(result, Err(ConvertError::OwnerOnly { .. })));
    }
}
