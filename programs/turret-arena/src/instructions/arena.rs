//! Arena lifecycle instructions

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use arena_ledger::rules;
use crate::state::{
    Arena, Config, PlatoonMember, UnitSlot, ArenaLaunched, BountyPaid, CooldownElapsed,
    PhaseAdvanced, PhaseGateOpened, SlotFilled,
};
use crate::error::ArenaError;

/// Launch the next arena
#[derive(Accounts)]
pub struct LaunchArena<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = operator,
        space = Arena::LEN,
        seeds = [b"arena", config.next_arena_id().to_le_bytes().as_ref()],
        bump
    )]
    pub arena: Account<'info, Arena>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn launch_arena(ctx: Context<LaunchArena>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let arena = &mut ctx.accounts.arena;
    let clock = Clock::get()?;

    let arena_id = config.arena_counter
        .checked_add(1).ok_or(ArenaError::Overflow)?;
    let unlock_tick = rules::next_unlock(clock.slot).map_err(ArenaError::from)?;

    config.arena_counter = arena_id;

    arena.id = arena_id;
    arena.start_tick = clock.slot;
    arena.phase = 0;
    arena.terminated = false;
    arena.bounty_claimed = 0;
    arena.pool = 0;
    arena.unlock_tick = unlock_tick;
    arena.bump = ctx.bumps.arena;

    emit!(ArenaLaunched {
        arena_id,
        start_tick: clock.slot,
        unlock_tick,
    });
    msg!("Arena {} launched, first claim unlocks at slot {}", arena_id, unlock_tick);

    Ok(())
}

/// Man a platoon slot
#[derive(Accounts)]
#[instruction(arena_id: u64, unit: Pubkey, slot: u8)]
pub struct AssignSlot<'info> {
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

    #[account(
        init_if_needed,
        payer = operator,
        space = PlatoonMember::LEN,
        seeds = [b"platoon", arena_id.to_le_bytes().as_ref(), slot.to_le_bytes().as_ref()],
        bump
    )]
    pub platoon_member: Account<'info, PlatoonMember>,

    /// Global reverse index, overwritten by every assignment of this unit
    #[account(
        init_if_needed,
        payer = operator,
        space = UnitSlot::LEN,
        seeds = [b"unit_slot", unit.as_ref()],
        bump
    )]
    pub unit_slot: Account<'info, UnitSlot>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn assign_slot(
    ctx: Context<AssignSlot>,
    arena_id: u64,
    unit: Pubkey,
    slot: u8,
) -> Result<()> {
    let config = &ctx.accounts.config;
    let arena = &ctx.accounts.arena;
    let member = &mut ctx.accounts.platoon_member;
    let unit_slot = &mut ctx.accounts.unit_slot;
    let clock = Clock::get()?;

    rules::check_arena_id(arena_id, config.arena_counter).map_err(ArenaError::from)?;
    require!(!arena.terminated, ArenaError::InvalidPhase);
    require!(unit != Pubkey::default(), ArenaError::ZeroAddress);
    rules::check_slot(slot).map_err(ArenaError::from)?;
    require!(member.unit == Pubkey::default(), ArenaError::SlotOccupied);

    member.unit = unit;
    member.enlisted_at_tick = clock.slot;
    member.active = true;
    member.battery_level = rules::FULL_BATTERY;
    member.last_fire_tick = 0;
    member.bump = ctx.bumps.platoon_member;

    unit_slot.unit = unit;
    unit_slot.slot = slot;
    unit_slot.bump = ctx.bumps.unit_slot;

    emit!(SlotFilled { arena_id, unit, slot });
    msg!("Unit {} enlisted in arena {} slot {}", unit, arena_id, slot);

    Ok(())
}

/// Advance an arena by one phase
#[derive(Accounts)]
#[instruction(arena_id: u64)]
pub struct AdvancePhase<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"arena", arena_id.to_le_bytes().as_ref()],
        bump = arena.bump
    )]
    pub arena: Account<'info, Arena>,

    pub operator: Signer<'info>,
}

pub fn advance_phase(ctx: Context<AdvancePhase>, arena_id: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    let arena = &mut ctx.accounts.arena;
    let clock = Clock::get()?;

    rules::check_arena_id(arena_id, config.arena_counter).map_err(ArenaError::from)?;
    let phase = rules::next_phase(arena.phase, arena.terminated).map_err(ArenaError::from)?;
    arena.phase = phase;

    emit!(PhaseAdvanced { arena_id, phase });
    emit!(PhaseGateOpened {
        arena_id,
        phase,
        tick: clock.slot,
    });
    msg!(
        "Arena {} advanced to phase {} ({})",
        arena_id,
        phase,
        rules::phase_label(phase).unwrap_or("?")
    );

    Ok(())
}

/// Add lamports to an arena's bounty pool (escrowed in the arena account)
#[derive(Accounts)]
#[instruction(arena_id: u64)]
pub struct SeedBountyPool<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"arena", arena_id.to_le_bytes().as_ref()],
        bump = arena.bump
    )]
    pub arena: Account<'info, Arena>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn seed_bounty_pool(ctx: Context<SeedBountyPool>, arena_id: u64, payment: u64) -> Result<()> {
    let config = &ctx.accounts.config;

    rules::check_arena_id(arena_id, config.arena_counter).map_err(ArenaError::from)?;
    require!(payment > 0, ArenaError::ZeroAmount);

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.operator.to_account_info(),
                to: ctx.accounts.arena.to_account_info(),
            },
        ),
        payment,
    )?;

    let arena = &mut ctx.accounts.arena;
    arena.pool = arena.pool
        .checked_add(payment).ok_or(ArenaError::Overflow)?;

    msg!("Arena {} bounty pool seeded with {} lamports, pool = {}", arena_id, payment, arena.pool);
    Ok(())
}

/// Pay out an arena's bounty pool to vault and sentinel
#[derive(Accounts)]
#[instruction(arena_id: u64)]
pub struct ClaimBounty<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized,
        constraint = !config.paused @ ArenaError::Paused,
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"arena", arena_id.to_le_bytes().as_ref()],
        bump = arena.bump
    )]
    pub arena: Account<'info, Arena>,

    /// CHECK: Validated against config.vault
    #[account(mut, address = config.vault @ ArenaError::InvalidRecipient)]
    pub vault: AccountInfo<'info>,

    /// CHECK: Validated against config.sentinel
    #[account(mut, address = config.sentinel @ ArenaError::InvalidRecipient)]
    pub sentinel: AccountInfo<'info>,

    pub operator: Signer<'info>,
}

pub fn claim_bounty(ctx: Context<ClaimBounty>, arena_id: u64) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let arena = &mut ctx.accounts.arena;
    let clock = Clock::get()?;

    rules::check_arena_id(arena_id, config.arena_counter).map_err(ArenaError::from)?;
    require!(!arena.terminated, ArenaError::InvalidPhase);
    require!(
        rules::claim_window_open(clock.slot, arena.unlock_tick),
        ArenaError::ClaimCooldownActive
    );
    require!(arena.pool > 0, ArenaError::BountyPoolEmpty);

    let pool = arena.pool;
    let (vault_amount, sentinel_amount) = rules::split_bounty(pool as u128);
    let vault_amount = u64::try_from(vault_amount).map_err(|_| ArenaError::Overflow)?;
    let sentinel_amount = u64::try_from(sentinel_amount).map_err(|_| ArenaError::Overflow)?;
    let next_unlock_tick = rules::next_unlock(clock.slot).map_err(ArenaError::from)?;

    // Never dip below the arena's rent-exempt minimum
    let rent = Rent::get()?;
    let min_balance = rent.minimum_balance(arena.to_account_info().data_len());
    let available = arena.to_account_info().lamports().saturating_sub(min_balance);
    require!(available >= pool, ArenaError::TransferFailed);

    arena.pool = 0;
    arena.bounty_claimed = arena.bounty_claimed
        .checked_add(pool).ok_or(ArenaError::Overflow)?;
    arena.unlock_tick = next_unlock_tick;
    config.total_bounties_paid = config.total_bounties_paid
        .checked_add(pool).ok_or(ArenaError::Overflow)?;

    **arena.to_account_info().try_borrow_mut_lamports()? -= pool;
    **ctx.accounts.vault.try_borrow_mut_lamports()? += vault_amount;
    **ctx.accounts.sentinel.try_borrow_mut_lamports()? += sentinel_amount;

    emit!(BountyPaid {
        arena_id,
        vault_amount,
        sentinel_amount,
    });
    emit!(CooldownElapsed {
        arena_id,
        next_unlock_tick,
    });
    msg!(
        "Arena {} bounty paid: {} to vault, {} to sentinel, next claim at slot {}",
        arena_id,
        vault_amount,
        sentinel_amount,
        next_unlock_tick
    );

    Ok(())
}
