//! Account state definitions

use anchor_lang::prelude::*;

/// Maximum token name length stored on-chain
pub const MAX_NAME_LEN: usize = 32;

/// Maximum token symbol length stored on-chain
pub const MAX_SYMBOL_LEN: usize = 10;

/// Global configuration account
#[account]
#[derive(Default)]
pub struct Config {
    /// Only signer allowed to run the arena lifecycle (never reassigned)
    pub operator: Pubkey,
    /// Receives deploy fees and the vault share of bounties
    pub vault: Pubkey,
    /// Receives the sentinel share of bounties
    pub sentinel: Pubkey,
    /// If true, pausable instructions are rejected
    pub paused: bool,
    /// Last arena id handed out (ids start at 1)
    pub arena_counter: u64,
    /// Lifetime bounty paid out across all arenas (lamports)
    pub total_bounties_paid: u64,
    /// Number of chassis tokens deployed
    pub deploy_count: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 + // discriminator
        32 +  // operator
        32 +  // vault
        32 +  // sentinel
        1 +   // paused
        8 +   // arena_counter
        8 +   // total_bounties_paid
        8 +   // deploy_count
        1 +   // bump
        16;   // padding

    /// Seed index of the next arena. Wraps at the top; the handler rejects that case.
    pub fn next_arena_id(&self) -> u64 {
        self.arena_counter.wrapping_add(1)
    }

    /// Seed index of the next chassis token
    pub fn next_deploy_index(&self) -> u64 {
        self.deploy_count.wrapping_add(1)
    }
}

/// Arena account, also escrows the bounty pool lamports
#[account]
#[derive(Default)]
pub struct Arena {
    /// Arena ID
    pub id: u64,
    /// Slot the arena was launched at
    pub start_tick: u64,
    /// 0..=6
    pub phase: u8,
    pub terminated: bool,
    /// Cumulative bounty paid out of this arena (lamports)
    pub bounty_claimed: u64,
    /// Pooled bounty awaiting a claim (lamports)
    pub pool: u64,
    /// Slot at which the next claim unlocks
    pub unlock_tick: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl Arena {
    pub const LEN: usize = 8 + // discriminator
        8 +   // id
        8 +   // start_tick
        1 +   // phase
        1 +   // terminated
        8 +   // bounty_claimed
        8 +   // pool
        8 +   // unlock_tick
        1 +   // bump
        16;   // padding
}

/// Platoon slot within an arena. Never vacated once manned.
#[account]
#[derive(Default)]
pub struct PlatoonMember {
    /// Default pubkey = unoccupied
    pub unit: Pubkey,
    pub enlisted_at_tick: u64,
    pub active: bool,
    /// 0..=100
    pub battery_level: u64,
    /// 0 until the first shot
    pub last_fire_tick: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl PlatoonMember {
    pub const LEN: usize = 8 + // discriminator
        32 +  // unit
        8 +   // enlisted_at_tick
        1 +   // active
        8 +   // battery_level
        8 +   // last_fire_tick
        1 +   // bump
        8;    // padding
}

/// Global unit -> slot reverse index (last assignment wins, across arenas)
#[account]
#[derive(Default)]
pub struct UnitSlot {
    pub unit: Pubkey,
    pub slot: u8,
    /// PDA bump seed
    pub bump: u8,
}

impl UnitSlot {
    pub const LEN: usize = 8 + 32 + 1 + 1;
}

/// Lifetime statistics for a unit
#[account]
#[derive(Default)]
pub struct ChassisStats {
    pub unit: Pubkey,
    pub damage_dealt: u128,
    /// Not incremented by any instruction
    pub battles_won: u64,
    pub last_fire_tick: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl ChassisStats {
    pub const LEN: usize = 8 + // discriminator
        32 +  // unit
        16 +  // damage_dealt
        8 +   // battles_won
        8 +   // last_fire_tick
        1 +   // bump
        8;    // padding
}

/// Chassis token record, one per deployment.
/// Seeded by its 1-based deploy index, so the PDA doubles as the index mapping.
#[account]
#[derive(Default)]
pub struct ChassisToken {
    /// 1-based deploy index
    pub index: u64,
    /// Unique token id (salt derived from slot, owner and deploy count)
    pub token_id: [u8; 32],
    pub owner: Pubkey,
    pub name: String,
    pub symbol: String,
    pub supply: u64,
    pub created_at: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl ChassisToken {
    pub const LEN: usize = 8 + // discriminator
        8 +   // index
        32 +  // token_id
        32 +  // owner
        4 + MAX_NAME_LEN +
        4 + MAX_SYMBOL_LEN +
        8 +   // supply
        8 +   // created_at
        1;    // bump
}

// ── Events ────────────────────────────────────────────────────────────────────

#[event]
pub struct ArenaLaunched {
    pub arena_id: u64,
    pub start_tick: u64,
    pub unlock_tick: u64,
}

#[event]
pub struct SlotFilled {
    pub arena_id: u64,
    pub unit: Pubkey,
    pub slot: u8,
}

#[event]
pub struct PhaseAdvanced {
    pub arena_id: u64,
    pub phase: u8,
}

#[event]
pub struct PhaseGateOpened {
    pub arena_id: u64,
    pub phase: u8,
    pub tick: u64,
}

#[event]
pub struct TurretFired {
    pub arena_id: u64,
    pub unit: Pubkey,
    pub damage: u64,
    pub battery_level: u64,
}

#[event]
pub struct ChassisSpawned {
    pub token: Pubkey,
    pub token_id: [u8; 32],
    pub owner: Pubkey,
    pub index: u64,
    pub name: String,
    pub symbol: String,
    pub supply: u64,
}

#[event]
pub struct BatteryCharged {
    pub unit: Pubkey,
    pub amount: u64,
}

#[event]
pub struct CortexLinked {
    pub unit: Pubkey,
    pub cortex_id: u64,
}

#[event]
pub struct BountyPaid {
    pub arena_id: u64,
    pub vault_amount: u64,
    pub sentinel_amount: u64,
}

#[event]
pub struct CooldownElapsed {
    pub arena_id: u64,
    pub next_unlock_tick: u64,
}

#[event]
pub struct OperatorRelayed {
    pub current: Pubkey,
    pub proposed: Pubkey,
}

#[event]
pub struct PauseFlipped {
    pub paused: bool,
}
