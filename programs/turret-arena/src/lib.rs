//! Turret Arena - operator-run arenas with pooled bounties
//!
//! A Solana program hosting the arena ledger: arenas advance through
//! seven phases, platoon slots fire on a battery budget, and each arena's
//! bounty pool is split between vault and sentinel on a cooldown.
//! Rule checks live in the `arena-ledger` crate.

use anchor_lang::prelude::*;

mod state;
mod instructions;
mod error;

use instructions::*;

declare_id!("FRcMctegSFAnWjw7eJQ5UXYcTxDCzjxMS1A97K5LYTQK");

#[program]
pub mod turret_arena {
    use super::*;

    /// Initialize the global config with the operator, vault and sentinel (one-time setup)
    pub fn initialize_config(
        ctx: Context<InitializeConfig>,
        params: InitializeConfigParams,
    ) -> Result<()> {
        instructions::admin::initialize_config(ctx, params)
    }

    /// Toggle the pause flag (operator only)
    pub fn flip_pause(ctx: Context<OperatorConfig>) -> Result<()> {
        instructions::admin::flip_pause(ctx)
    }

    /// Announce a new operator; the stored operator does not change
    pub fn relay_operator(ctx: Context<OperatorConfig>, new_operator: Pubkey) -> Result<()> {
        instructions::admin::relay_operator(ctx, new_operator)
    }

    /// Permanently close an arena
    pub fn terminate(ctx: Context<Terminate>, arena_id: u64) -> Result<()> {
        instructions::admin::terminate(ctx, arena_id)
    }

    /// Launch the next arena at phase 0
    pub fn launch_arena(ctx: Context<LaunchArena>) -> Result<()> {
        instructions::arena::launch_arena(ctx)
    }

    /// Man an empty platoon slot
    pub fn assign_slot(
        ctx: Context<AssignSlot>,
        arena_id: u64,
        unit: Pubkey,
        slot: u8,
    ) -> Result<()> {
        instructions::arena::assign_slot(ctx, arena_id, unit, slot)
    }

    /// Advance an arena by one phase
    pub fn advance_phase(ctx: Context<AdvancePhase>, arena_id: u64) -> Result<()> {
        instructions::arena::advance_phase(ctx, arena_id)
    }

    /// Add lamports to an arena's bounty pool
    pub fn seed_bounty_pool(
        ctx: Context<SeedBountyPool>,
        arena_id: u64,
        payment: u64,
    ) -> Result<()> {
        instructions::arena::seed_bounty_pool(ctx, arena_id, payment)
    }

    /// Split an arena's bounty pool between vault and sentinel
    pub fn claim_bounty(ctx: Context<ClaimBounty>, arena_id: u64) -> Result<()> {
        instructions::arena::claim_bounty(ctx, arena_id)
    }

    /// Fire a unit's turret
    pub fn fire(ctx: Context<Fire>, arena_id: u64, unit: Pubkey, damage: u64) -> Result<()> {
        instructions::chassis::fire(ctx, arena_id, unit, damage)
    }

    /// Request a battery charge (emits only)
    pub fn charge_battery(ctx: Context<ChargeBattery>, unit: Pubkey, amount: u64) -> Result<()> {
        instructions::chassis::charge_battery(ctx, unit, amount)
    }

    /// Link a cortex to a unit (emits only)
    pub fn link_cortex(ctx: Context<OperatorAction>, unit: Pubkey, cortex_id: u64) -> Result<()> {
        instructions::chassis::link_cortex(ctx, unit, cortex_id)
    }

    /// Deploy a chassis token record, paying the deploy fee to the vault
    pub fn deploy_chassis(
        ctx: Context<DeployChassis>,
        name: String,
        symbol: String,
        supply: u64,
        payment: u64,
    ) -> Result<()> {
        instructions::chassis::deploy_chassis(ctx, name, symbol, supply, payment)
    }
}
