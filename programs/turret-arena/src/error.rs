//! Custom error codes

use anchor_lang::prelude::*;
use arena_ledger::LedgerError;

#[error_code]
pub enum ArenaError {
    #[msg("Not authorized to perform this action")]
    Unauthorized = 6000,

    #[msg("Arena is paused")]
    Paused = 6001,

    #[msg("Arena does not exist")]
    ArenaNotFound = 6002,

    #[msg("Unit has no slot assignment or chassis history")]
    ChassisNotFound = 6003,

    #[msg("Platoon slot is already manned")]
    SlotOccupied = 6004,

    #[msg("Platoon slot is beyond the platoon size")]
    PlatoonFull = 6005,

    #[msg("Unit is not enlisted in this arena")]
    UnitNotEnlisted = 6006,

    #[msg("Battery below the firing threshold")]
    BatteryDepleted = 6007,

    #[msg("Bounty claim cooldown still active")]
    ClaimCooldownActive = 6008,

    #[msg("Turret cooldown still active")]
    FireCooldownActive = 6009,

    #[msg("Invalid phase for this action")]
    InvalidPhase = 6010,

    #[msg("Bounty pool is empty")]
    BountyPoolEmpty = 6011,

    #[msg("Zero address")]
    ZeroAddress = 6012,

    #[msg("Name is empty or too long")]
    NameEmpty = 6013,

    #[msg("Symbol is empty or too long")]
    SymbolEmpty = 6014,

    #[msg("Supply outside the allowed bounds")]
    SupplyOutOfBounds = 6015,

    #[msg("Amount must be non-zero")]
    ZeroAmount = 6016,

    #[msg("Payment below the deploy fee")]
    InsufficientPayment = 6017,

    #[msg("Fund transfer failed")]
    TransferFailed = 6018,

    #[msg("Arithmetic overflow")]
    Overflow = 6019,

    #[msg("Unsolicited payment rejected")]
    UnsolicitedPayment = 6020,

    #[msg("Token record creation failed")]
    RecordCreationFailed = 6021,

    #[msg("Recipient does not match the configured vault or sentinel")]
    InvalidRecipient = 6022,

    #[msg("Address must be 32 bytes of hex")]
    InvalidAddress = 6023,
}

impl From<LedgerError> for ArenaError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Unauthorized => ArenaError::Unauthorized,
            LedgerError::Paused => ArenaError::Paused,
            LedgerError::ArenaNotFound(_) => ArenaError::ArenaNotFound,
            LedgerError::ChassisNotFound => ArenaError::ChassisNotFound,
            LedgerError::SlotOccupied { .. } => ArenaError::SlotOccupied,
            LedgerError::PlatoonFull(_) => ArenaError::PlatoonFull,
            LedgerError::UnitNotEnlisted => ArenaError::UnitNotEnlisted,
            LedgerError::BatteryDepleted(_) => ArenaError::BatteryDepleted,
            LedgerError::ClaimCooldownActive { .. } => ArenaError::ClaimCooldownActive,
            LedgerError::FireCooldownActive { .. } => ArenaError::FireCooldownActive,
            LedgerError::InvalidPhase => ArenaError::InvalidPhase,
            LedgerError::BountyPoolEmpty => ArenaError::BountyPoolEmpty,
            LedgerError::ZeroAddress => ArenaError::ZeroAddress,
            LedgerError::InvalidAddress => ArenaError::InvalidAddress,
            LedgerError::NameEmpty => ArenaError::NameEmpty,
            LedgerError::SymbolEmpty => ArenaError::SymbolEmpty,
            LedgerError::SupplyOutOfBounds(_) => ArenaError::SupplyOutOfBounds,
            LedgerError::ZeroAmount => ArenaError::ZeroAmount,
            LedgerError::UnsolicitedPayment => ArenaError::UnsolicitedPayment,
            LedgerError::InsufficientPayment { .. } => ArenaError::InsufficientPayment,
            LedgerError::TransferFailed => ArenaError::TransferFailed,
            LedgerError::RecordCreationFailed => ArenaError::RecordCreationFailed,
            LedgerError::Overflow => ArenaError::Overflow,
        }
    }
}
