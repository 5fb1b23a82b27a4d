//! Unit and chassis instructions

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use arena_ledger::{rules, salt_preimage, Address};
use crate::state::{
    Arena, ChassisStats, ChassisToken, Config, PlatoonMember, UnitSlot, BatteryCharged,
    ChassisSpawned, CortexLinked, TurretFired, MAX_NAME_LEN, MAX_SYMBOL_LEN,
};
use crate::error::ArenaError;

/// Fire a unit's turret
#[derive(Accounts)]
#[instruction(arena_id: u64, unit: Pubkey)]
pub struct Fire<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [b"arena", arena_id.to_le_bytes().as_ref()],
        bump = arena.bump
    )]
    pub arena: Account<'info, Arena>,

    /// Resolves the slot; may point at the unit's post in a different arena
    #[account(
        seeds = [b"unit_slot", unit.as_ref()],
        bump = unit_slot.bump
    )]
    pub unit_slot: Account<'info, UnitSlot>,

    #[account(
        mut,
        seeds = [b"platoon", arena_id.to_le_bytes().as_ref(), unit_slot.slot.to_le_bytes().as_ref()],
        bump = platoon_member.bump
    )]
    pub platoon_member: Account<'info, PlatoonMember>,

    #[account(
        init_if_needed,
        payer = operator,
        space = ChassisStats::LEN,
        seeds = [b"chassis", unit.as_ref()],
        bump
    )]
    pub chassis_stats: Account<'info, ChassisStats>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn fire(ctx: Context<Fire>, arena_id: u64, unit: Pubkey, damage: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    let member = &mut ctx.accounts.platoon_member;
    let stats = &mut ctx.accounts.chassis_stats;
    let clock = Clock::get()?;

    require!(unit != Pubkey::default(), ArenaError::ZeroAddress);
    rules::check_arena_id(arena_id, config.arena_counter).map_err(ArenaError::from)?;
    require!(member.unit == unit, ArenaError::UnitNotEnlisted);

    let battery_level = rules::discharge(member.battery_level, member.last_fire_tick, clock.slot)
        .map_err(ArenaError::from)?;
    member.battery_level = battery_level;
    member.last_fire_tick = clock.slot;

    if stats.unit == Pubkey::default() {
        stats.unit = unit;
        stats.bump = ctx.bumps.chassis_stats;
    }
    stats.damage_dealt = stats.damage_dealt
        .checked_add(damage as u128).ok_or(ArenaError::Overflow)?;
    stats.last_fire_tick = clock.slot;

    emit!(TurretFired {
        arena_id,
        unit,
        damage,
        battery_level,
    });
    msg!("Unit {} fired in arena {} for {} damage, battery {}", unit, arena_id, damage, battery_level);

    Ok(())
}

/// Request a battery charge for a known unit (notification only)
#[derive(Accounts)]
#[instruction(unit: Pubkey)]
pub struct ChargeBattery<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    /// Present if the unit was ever assigned a slot
    #[account(seeds = [b"unit_slot", unit.as_ref()], bump)]
    pub unit_slot: Option<Account<'info, UnitSlot>>,

    /// Present if the unit has fired or deployed a chassis
    #[account(seeds = [b"chassis", unit.as_ref()], bump)]
    pub chassis_stats: Option<Account<'info, ChassisStats>>,

    pub operator: Signer<'info>,
}

pub fn charge_battery(ctx: Context<ChargeBattery>, unit: Pubkey, amount: u64) -> Result<()> {
    require!(unit != Pubkey::default(), ArenaError::ZeroAddress);
    require!(
        ctx.accounts.unit_slot.is_some() || ctx.accounts.chassis_stats.is_some(),
        ArenaError::ChassisNotFound
    );

    emit!(BatteryCharged { unit, amount });
    msg!("Battery charge of {} requested for {}", amount, unit);
    Ok(())
}

/// Operator action that respects the pause flag and touches no other account
#[derive(Accounts)]
pub struct OperatorAction<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    pub operator: Signer<'info>,
}

pub fn link_cortex(_ctx: Context<OperatorAction>, unit: Pubkey, cortex_id: u64) -> Result<()> {
    require!(unit != Pubkey::default(), ArenaError::ZeroAddress);

    emit!(CortexLinked { unit, cortex_id });
    msg!("Cortex {} linked to {}", cortex_id, unit);
    Ok(())
}

/// Deploy a chassis token record (anyone, fee forwarded to the vault)
#[derive(Accounts)]
pub struct DeployChassis<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = deployer,
        space = ChassisToken::LEN,
        seeds = [b"chassis_token", config.next_deploy_index().to_le_bytes().as_ref()],
        bump
    )]
    pub chassis_token: Account<'info, ChassisToken>,

    #[account(
        init_if_needed,
        payer = deployer,
        space = ChassisStats::LEN,
        seeds = [b"chassis", deployer.key().as_ref()],
        bump
    )]
    pub chassis_stats: Account<'info, ChassisStats>,

    /// CHECK: Validated against config.vault
    #[account(mut, address = config.vault @ ArenaError::InvalidRecipient)]
    pub vault: AccountInfo<'info>,

    #[account(mut)]
    pub deployer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn deploy_chassis(
    ctx: Context<DeployChassis>,
    name: String,
    symbol: String,
    supply: u64,
    payment: u64,
) -> Result<()> {
    rules::validate_deploy(
        payment as u128,
        rules::DEPLOY_FEE_LAMPORTS as u128,
        &name,
        &symbol,
        supply as u128,
    )
    .map_err(ArenaError::from)?;
    require!(name.len() <= MAX_NAME_LEN, ArenaError::NameEmpty);
    require!(symbol.len() <= MAX_SYMBOL_LEN, ArenaError::SymbolEmpty);

    let clock = Clock::get()?;
    let owner = ctx.accounts.deployer.key();

    // Same preimage the ledger crate hashes with sha2
    let preimage = salt_preimage(
        clock.slot,
        &Address(owner.to_bytes()),
        ctx.accounts.config.deploy_count,
    );
    let token_id = solana_sha256_hasher::hash(&preimage).to_bytes();

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.deployer.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
            },
        ),
        payment,
    )
    .map_err(|_| ArenaError::TransferFailed)?;

    let config = &mut ctx.accounts.config;
    let index = config.deploy_count
        .checked_add(1).ok_or(ArenaError::Overflow)?;
    config.deploy_count = index;

    let token = &mut ctx.accounts.chassis_token;
    token.index = index;
    token.token_id = token_id;
    token.owner = owner;
    token.name = name;
    token.symbol = symbol;
    token.supply = supply;
    token.created_at = clock.slot;
    token.bump = ctx.bumps.chassis_token;

    let stats = &mut ctx.accounts.chassis_stats;
    if stats.unit == Pubkey::default() {
        stats.unit = owner;
        stats.bump = ctx.bumps.chassis_stats;
    }

    emit!(ChassisSpawned {
        token: token.key(),
        token_id,
        owner,
        index,
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        supply,
    });
    msg!("Chassis #{} {} ({}) deployed by {}", index, token.name, token.symbol, owner);

    Ok(())
}
