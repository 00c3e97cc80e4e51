//! In-Memory Host
//!
//! Executes calls against the token ledgers and the convertor the way a
//! chain would: every public call is one atomic unit. On error, ledgers and
//! convertor state roll back to what they were before the call and the
//! call's events are discarded.
//!
//! The hook primitives live here because they cross contracts:
//! `approve_and_call` records the allowance and then invokes
//! `receive_approval` with the token as caller; `transfer_and_call` pushes
//! the tokens and then invokes `convert_to_old` with the token as caller.

use sha2::{Digest, Sha256};
use tracing::debug;

use emon_common::{
    errors::{ConvertError, ConvertResult},
    events::{ConvertorEvent, EventLog},
    ledger::TokenLedgers,
    math::Quote,
    types::{
        Address, Amount, ConversionDirection, ConvertorAction, ReserveBalances, ZERO_ADDRESS,
    },
};
use emon_token::{TokenMetadata, TokenRegistry, TokenState};

use crate::{CallContext, Conversion, TokenConvertor};

/// Derive a contract address from its deployer and the deployment nonce
pub fn derive_contract_address(deployer: &Address, nonce: u64) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(b"emon-contract");
    hasher.update(deployer);
    hasher.update(nonce.to_le_bytes());
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

/// Ledgers plus the convertor, executed call by call
#[derive(Debug, Clone)]
pub struct Chain {
    registry: TokenRegistry,
    convertor: TokenConvertor,
    nonce: u64,
}

impl Chain {
    /// Boot a chain with the convertor deployed by `operator`
    pub fn new(operator: Address) -> ConvertResult<Self> {
        let address = derive_contract_address(&operator, 0);
        Ok(Self {
            registry: TokenRegistry::new(),
            convertor: TokenConvertor::new(address, operator)?,
            nonce: 1,
        })
    }

    // ============ Views ============

    pub fn convertor(&self) -> &TokenConvertor {
        &self.convertor
    }

    pub fn convertor_address(&self) -> Address {
        self.convertor.address
    }

    pub fn block_height(&self) -> u64 {
        self.registry.block_height
    }

    /// Every event emitted by a successful call, in order
    pub fn events(&self) -> &EventLog {
        &self.registry.events
    }

    pub fn token(&self, token: &Address) -> ConvertResult<&TokenState> {
        self.registry.get(token)
    }

    pub fn balance_of(&self, token: &Address, owner: &Address) -> ConvertResult<Amount> {
        self.registry.balance_of(token, owner)
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> ConvertResult<Amount> {
        Ok(self.registry.get(token)?.allowance(owner, spender))
    }

    pub fn reserves(&self) -> ConvertResult<ReserveBalances> {
        self.convertor.reserves(&self.registry)
    }

    pub fn quote(&self, direction: ConversionDirection, amount: Amount) -> ConvertResult<Quote> {
        self.convertor.quote(direction, amount)
    }

    // ============ Deployment ============

    /// Deploy a token with its supply minted to `allocations`
    pub fn deploy_token(
        &mut self,
        deployer: Address,
        metadata: TokenMetadata,
        allocations: &[(Address, Amount)],
    ) -> ConvertResult<Address> {
        self.atomic(|chain| {
            let address = derive_contract_address(&deployer, chain.nonce);
            chain.nonce += 1;

            let symbol = metadata.symbol.clone();
            let token = TokenState::with_allocations(address, metadata, allocations)?;
            chain.registry.register(token)?;

            // Genesis mints show up as transfers from the zero address
            for (holder, amount) in allocations {
                chain.registry.events.emit(ConvertorEvent::Transfer {
                    token: address,
                    from: ZERO_ADDRESS,
                    to: *holder,
                    amount: *amount,
                    block_height: chain.registry.block_height,
                });
            }

            debug!(%symbol, "token deployed");
            Ok(address)
        })
    }

    // ============ Ledger Calls ============

    pub fn transfer(
        &mut self,
        sender: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        self.atomic(|chain| chain.registry.transfer(&token, &sender, &to, amount))
    }

    pub fn approve(
        &mut self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        self.atomic(|chain| chain.registry.approve(&token, &owner, &spender, amount))
    }

    /// Approve `spender` and notify it in the same call
    pub fn approve_and_call(
        &mut self,
        sender: Address,
        token: Address,
        spender: Address,
        amount: Amount,
        data: &[u8],
    ) -> ConvertResult<Conversion> {
        self.atomic(|chain| {
            chain.registry.approve(&token, &sender, &spender, amount)?;
            chain.ensure_receiver(&spender)?;
            chain.call_convertor(token, |convertor, ctx| {
                convertor.receive_approval(ctx, sender, amount, token, data)
            })
        })
    }

    /// Transfer to `to` and notify it in the same call
    pub fn transfer_and_call(
        &mut self,
        sender: Address,
        token: Address,
        to: Address,
        amount: Amount,
        _data: &[u8],
    ) -> ConvertResult<Conversion> {
        self.atomic(|chain| {
            chain.registry.transfer(&token, &sender, &to, amount)?;
            chain.ensure_receiver(&to)?;
            chain.call_convertor(token, |convertor, ctx| {
                convertor.convert_to_old(ctx, amount, sender)
            })
        })
    }

    // ============ Direct Convertor Calls ============

    /// Invoke the upgrade hook directly as `caller`
    pub fn receive_approval(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
        token: Address,
        data: &[u8],
    ) -> ConvertResult<Conversion> {
        self.atomic(|chain| {
            chain.call_convertor(caller, |convertor, ctx| {
                convertor.receive_approval(ctx, from, amount, token, data)
            })
        })
    }

    /// Invoke the downgrade hook directly as `caller`
    pub fn convert_to_old(
        &mut self,
        caller: Address,
        amount: Amount,
        beneficiary: Address,
    ) -> ConvertResult<Conversion> {
        self.atomic(|chain| {
            chain.call_convertor(caller, |convertor, ctx| {
                convertor.convert_to_old(ctx, amount, beneficiary)
            })
        })
    }

    /// Run an operator action as `caller`
    pub fn execute(&mut self, caller: Address, action: ConvertorAction) -> ConvertResult<()> {
        self.atomic(|chain| {
            chain.call_convertor(caller, |convertor, ctx| convertor.execute(ctx, &action))
        })
    }

    pub fn set_address(&mut self, caller: Address, old_token: Address, new_token: Address) -> ConvertResult<()> {
        self.execute(caller, ConvertorAction::SetAddress { old_token, new_token })
    }

    pub fn set_upgradable(&mut self, caller: Address, enabled: bool) -> ConvertResult<()> {
        self.execute(caller, ConvertorAction::SetUpgradable { enabled })
    }

    pub fn set_downgradable(&mut self, caller: Address, enabled: bool) -> ConvertResult<()> {
        self.execute(caller, ConvertorAction::SetDowngradable { enabled })
    }

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> ConvertResult<()> {
        self.execute(caller, ConvertorAction::TransferOwnership { new_owner })
    }

    pub fn withdraw_reserve(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> ConvertResult<()> {
        self.execute(caller, ConvertorAction::WithdrawReserve { token, to, amount })
    }

    // ============ Execution ============

    /// Run `call` as one block; restore everything it touched on error
    fn atomic<T>(&mut self, call: impl FnOnce(&mut Self) -> ConvertResult<T>) -> ConvertResult<T> {
        self.registry.block_height += 1;
        let block_height = self.registry.block_height;
        let snapshot = (self.registry.clone(), self.convertor.clone(), self.nonce);

        match call(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!(code = err.code(), block_height, "call reverted");
                (self.registry, self.convertor, self.nonce) = snapshot;
                Err(err)
            }
        }
    }

    /// Call into the convertor with `caller` as the immediate invoker
    fn call_convertor<T>(
        &mut self,
        caller: Address,
        call: impl FnOnce(&mut TokenConvertor, &mut CallContext<'_, TokenRegistry>) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        let mut events = EventLog::new();
        let value = {
            let mut ctx = CallContext {
                caller,
                block_height: self.registry.block_height,
                ledgers: &mut self.registry,
                events: &mut events,
            };
            call(&mut self.convertor, &mut ctx)?
        };
        self.registry.events.append(events);
        Ok(value)
    }

    /// Only the convertor implements the token callbacks
    fn ensure_receiver(&self, address: &Address) -> ConvertResult<()> {
        if *address != self.convertor.address {
            return Err(ConvertError::NotAReceiver { address: *address });
        }
        Ok(())
    }
}
