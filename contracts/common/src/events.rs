//! Convertor Events
//!
//! Events are emitted during execution and can be indexed off-chain for
//! building UIs, analytics, and notifications. Every state change on a
//! ledger or on the convertor produces exactly one event.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, Amount, ConversionDirection};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Ledger Events (0x01 - 0x1F)
    Transfer = 0x01,
    Approval = 0x02,

    // Conversion Events (0x20 - 0x3F)
    Upgraded = 0x20,
    Downgraded = 0x21,

    // Operator Events (0x40 - 0x5F)
    AddressesSet = 0x40,
    DirectionToggled = 0x41,
    OwnershipTransferred = 0x42,
    ReserveWithdrawn = 0x43,
}

/// Main event enum containing all possible events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum ConvertorEvent {
    // ============ Ledger Events ============

    /// Emitted when a token balance moves
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
        block_height: u64,
    },

    /// Emitted when an allowance is recorded
    Approval {
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
        block_height: u64,
    },

    // ============ Conversion Events ============

    /// Emitted when old tokens are converted into new tokens
    Upgraded {
        account: Address,
        old_amount: Amount,
        new_amount: Amount,
        block_height: u64,
    },

    /// Emitted when new tokens are converted into old tokens
    Downgraded {
        account: Address,
        new_amount: Amount,
        old_amount: Amount,
        dust: Amount,
        block_height: u64,
    },

    // ============ Operator Events ============

    /// Emitted when the token pair is set
    AddressesSet {
        old_token: Address,
        new_token: Address,
        block_height: u64,
    },

    /// Emitted when a direction gate changes
    DirectionToggled {
        direction: ConversionDirection,
        enabled: bool,
        block_height: u64,
    },

    /// Emitted when the owner capability moves
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
        block_height: u64,
    },

    /// Emitted when the operator pulls reserve funds out
    ReserveWithdrawn {
        token: Address,
        to: Address,
        amount: Amount,
        block_height: u64,
    },
}

impl ConvertorEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Transfer { .. } => EventType::Transfer,
            Self::Approval { .. } => EventType::Approval,
            Self::Upgraded { .. } => EventType::Upgraded,
            Self::Downgraded { .. } => EventType::Downgraded,
            Self::AddressesSet { .. } => EventType::AddressesSet,
            Self::DirectionToggled { .. } => EventType::DirectionToggled,
            Self::OwnershipTransferred { .. } => EventType::OwnershipTransferred,
            Self::ReserveWithdrawn { .. } => EventType::ReserveWithdrawn,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> u64 {
        match self {
            Self::Transfer { block_height, .. } => *block_height,
            Self::Approval { block_height, .. } => *block_height,
            Self::Upgraded { block_height, .. } => *block_height,
            Self::Downgraded { block_height, .. } => *block_height,
            Self::AddressesSet { block_height, .. } => *block_height,
            Self::DirectionToggled { block_height, .. } => *block_height,
            Self::OwnershipTransferred { block_height, .. } => *block_height,
            Self::ReserveWithdrawn { block_height, .. } => *block_height,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ConvertorEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: ConvertorEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[ConvertorEvent] {
        &self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&ConvertorEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&ConvertorEvent> {
        self.events.last()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Move all events of `other` to the end of this log
    pub fn append(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }
}
