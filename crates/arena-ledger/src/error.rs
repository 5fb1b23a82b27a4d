//! Ledger error types

use thiserror::Error;

/// Every way a ledger operation can fail.
///
/// A failed operation leaves the ledger exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("caller is not the operator")]
    Unauthorized,

    #[error("ledger is paused")]
    Paused,

    #[error("arena {0} does not exist")]
    ArenaNotFound(u64),

    #[error("unit has no slot assignment or chassis history")]
    ChassisNotFound,

    #[error("platoon slot {slot} in arena {arena_id} is already manned")]
    SlotOccupied { arena_id: u64, slot: u8 },

    #[error("platoon slot {0} is beyond the platoon size")]
    PlatoonFull(u8),

    #[error("unit is not enlisted in this arena")]
    UnitNotEnlisted,

    #[error("battery at {0}, below the firing threshold")]
    BatteryDepleted(u64),

    #[error("bounty claim locked until tick {unlock_tick}")]
    ClaimCooldownActive { unlock_tick: u64 },

    #[error("turret cooling down until tick {ready_tick}")]
    FireCooldownActive { ready_tick: u64 },

    #[error("invalid phase for this action")]
    InvalidPhase,

    #[error("bounty pool is empty")]
    BountyPoolEmpty,

    #[error("zero address")]
    ZeroAddress,

    #[error("address must be 32 bytes of hex")]
    InvalidAddress,

    #[error("name is empty")]
    NameEmpty,

    #[error("symbol is empty")]
    SymbolEmpty,

    #[error("supply {0} outside the allowed bounds")]
    SupplyOutOfBounds(u128),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("unsolicited payment rejected")]
    UnsolicitedPayment,

    #[error("payment {paid} below the deploy fee {required}")]
    InsufficientPayment { paid: u128, required: u128 },

    #[error("fund transfer failed")]
    TransferFailed,

    #[error("token record factory failed")]
    RecordCreationFailed,

    #[error("arithmetic overflow")]
    Overflow,
}

/// Coarse classification callers use to decide whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Paused,
    NotFound,
    AlreadyExists,
    CapacityExceeded,
    ResourceDepleted,
    CooldownActive,
    PreconditionFailed,
    EmptyPool,
    InvalidInput,
    PaymentInsufficient,
    /// An external collaborator (fund transfer or record factory) failed.
    TransferFailed,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Unauthorized => ErrorKind::Unauthorized,
            LedgerError::Paused => ErrorKind::Paused,
            LedgerError::ArenaNotFound(_) | LedgerError::ChassisNotFound => ErrorKind::NotFound,
            LedgerError::SlotOccupied { .. } => ErrorKind::AlreadyExists,
            LedgerError::PlatoonFull(_) => ErrorKind::CapacityExceeded,
            LedgerError::BatteryDepleted(_) => ErrorKind::ResourceDepleted,
            LedgerError::ClaimCooldownActive { .. } | LedgerError::FireCooldownActive { .. } => {
                ErrorKind::CooldownActive
            }
            LedgerError::InvalidPhase | LedgerError::UnitNotEnlisted => ErrorKind::PreconditionFailed,
            LedgerError::BountyPoolEmpty => ErrorKind::EmptyPool,
            LedgerError::ZeroAddress
            | LedgerError::InvalidAddress
            | LedgerError::NameEmpty
            | LedgerError::SymbolEmpty
            | LedgerError::SupplyOutOfBounds(_)
            | LedgerError::ZeroAmount
            | LedgerError::UnsolicitedPayment
            | LedgerError::Overflow => ErrorKind::InvalidInput,
            LedgerError::InsufficientPayment { .. } => ErrorKind::PaymentInsufficient,
            LedgerError::TransferFailed | LedgerError::RecordCreationFailed => {
                ErrorKind::TransferFailed
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
