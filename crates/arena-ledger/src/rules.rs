//! Numeric rules shared by every host of the ledger
//!
//! These functions hold no state. The in-memory [`crate::Ledger`] and the
//! on-chain program both call them so phase, battery, cooldown and payout
//! arithmetic can only be defined once.

use crate::error::{LedgerError, Result};

/// Platoon slots per arena (valid slots are 0..24)
pub const MAX_PLATOON_SIZE: u8 = 24;

/// Ticks between bounty claims on the same arena
pub const CLAIM_COOLDOWN_TICKS: u64 = 73;

/// Ticks between two shots from the same unit
pub const FIRE_COOLDOWN_TICKS: u64 = 23;

/// Highest phase index ("Terminal")
pub const MAX_PHASE: u8 = 6;

/// Vault share of a claimed bounty, in percent
pub const VAULT_SHARE_PERCENT: u128 = 82;

/// Sentinel share of a claimed bounty, in percent (absorbs rounding)
pub const SENTINEL_SHARE_PERCENT: u128 = 18;

pub const FULL_BATTERY: u64 = 100;

/// Minimum battery level required to fire
pub const MIN_FIRE_BATTERY: u64 = 10;

/// Battery drained per shot
pub const FIRE_BATTERY_COST: u64 = 15;

/// Deploy fee: 0.0127 of the base currency at 18 decimals
pub const DEPLOY_FEE: u128 = 12_700_000_000_000_000;

/// Deploy fee on Solana: 0.0127 SOL
pub const DEPLOY_FEE_LAMPORTS: u64 = 12_700_000;

/// Token supply bounds, in whole units
pub const MIN_SUPPLY: u128 = 1_000;
pub const MAX_SUPPLY: u128 = 1_000_000_000_000;

const PHASE_LABELS: [&str; 7] = [
    "Idle",
    "Mobilizing",
    "Staging",
    "Engaged",
    "Overdrive",
    "Extraction",
    "Terminal",
];

/// Split a bounty pool between vault and sentinel.
///
/// `vault = floor(pool * 82 / 100)` and `sentinel = pool - vault`, so the two
/// always sum to `pool`. Computed per hundred so no intermediate overflows.
pub fn split_bounty(pool: u128) -> (u128, u128) {
    let vault = (pool / 100) * VAULT_SHARE_PERCENT + (pool % 100) * VAULT_SHARE_PERCENT / 100;
    (vault, pool - vault)
}

/// Phase after one advance, or `InvalidPhase` if the arena cannot move.
pub fn next_phase(phase: u8, terminated: bool) -> Result<u8> {
    if terminated || phase >= MAX_PHASE {
        return Err(LedgerError::InvalidPhase);
    }
    Ok(phase + 1)
}

/// Check a shot against battery and fire cooldown, returning the battery left.
///
/// A unit that has never fired (`last_fire_tick == 0`) is not cooling down.
/// The battery floors at zero.
pub fn discharge(battery_level: u64, last_fire_tick: u64, now: u64) -> Result<u64> {
    if battery_level < MIN_FIRE_BATTERY {
        return Err(LedgerError::BatteryDepleted(battery_level));
    }
    if last_fire_tick != 0 {
        let ready_tick = last_fire_tick.saturating_add(FIRE_COOLDOWN_TICKS);
        if now < ready_tick {
            return Err(LedgerError::FireCooldownActive { ready_tick });
        }
    }
    Ok(battery_level.saturating_sub(FIRE_BATTERY_COST))
}

pub fn claim_window_open(now: u64, unlock_tick: u64) -> bool {
    now >= unlock_tick
}

/// Claim unlock tick for a cooldown starting at `now`
pub fn next_unlock(now: u64) -> Result<u64> {
    now.checked_add(CLAIM_COOLDOWN_TICKS).ok_or(LedgerError::Overflow)
}

/// Arena ids are sequential starting at 1.
pub fn check_arena_id(arena_id: u64, arena_counter: u64) -> Result<()> {
    if arena_id == 0 || arena_id > arena_counter {
        return Err(LedgerError::ArenaNotFound(arena_id));
    }
    Ok(())
}

pub fn check_slot(slot: u8) -> Result<()> {
    if slot >= MAX_PLATOON_SIZE {
        return Err(LedgerError::PlatoonFull(slot));
    }
    Ok(())
}

/// Validate a chassis deployment: payment, then name, symbol, supply.
pub fn validate_deploy(
    payment: u128,
    fee: u128,
    name: &str,
    symbol: &str,
    supply: u128,
) -> Result<()> {
    if payment < fee {
        return Err(LedgerError::InsufficientPayment { paid: payment, required: fee });
    }
    if name.is_empty() {
        return Err(LedgerError::NameEmpty);
    }
    if symbol.is_empty() {
        return Err(LedgerError::SymbolEmpty);
    }
    if !(MIN_SUPPLY..=MAX_SUPPLY).contains(&supply) {
        return Err(LedgerError::SupplyOutOfBounds(supply));
    }
    Ok(())
}

/// Human-readable phase name; `None` past the terminal phase.
pub fn phase_label(phase: u8) -> Option<&'static str> {
    PHASE_LABELS.get(phase as usize).copied()
}
