//! Admin instructions

use anchor_lang::prelude::*;
use arena_ledger::{rules, Address, LedgerConfig};
use crate::state::{Arena, Config, OperatorRelayed, PauseFlipped};
use crate::error::ArenaError;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeConfigParams {
    pub operator: Pubkey,
    pub vault: Pubkey,
    pub sentinel: Pubkey,
}

/// Initialize the global config (one-time setup)
#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = payer,
        space = Config::LEN,
        seeds = [b"config"],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_config(
    ctx: Context<InitializeConfig>,
    params: InitializeConfigParams,
) -> Result<()> {
    let InitializeConfigParams {
        operator,
        vault,
        sentinel,
    } = params;

    LedgerConfig::new(
        Address(operator.to_bytes()),
        Address(vault.to_bytes()),
        Address(sentinel.to_bytes()),
    )
    .map_err(ArenaError::from)?;

    let config = &mut ctx.accounts.config;

    config.operator = operator;
    config.vault = vault;
    config.sentinel = sentinel;
    config.paused = false;
    config.arena_counter = 0;
    config.total_bounties_paid = 0;
    config.deploy_count = 0;
    config.bump = ctx.bumps.config;

    msg!(
        "Config initialized: operator = {}, vault = {}, sentinel = {}",
        config.operator,
        config.vault,
        config.sentinel
    );

    Ok(())
}

/// Operator-only, works while paused
#[derive(Accounts)]
pub struct OperatorConfig<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    pub operator: Signer<'info>,
}

pub fn flip_pause(ctx: Context<OperatorConfig>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.paused = !config.paused;

    emit!(PauseFlipped { paused: config.paused });
    msg!("Paused = {}", config.paused);
    Ok(())
}

/// Announce a new operator. The stored operator is left unchanged.
pub fn relay_operator(ctx: Context<OperatorConfig>, new_operator: Pubkey) -> Result<()> {
    require!(new_operator != Pubkey::default(), ArenaError::ZeroAddress);

    let config = &ctx.accounts.config;
    emit!(OperatorRelayed {
        current: config.operator,
        proposed: new_operator,
    });
    msg!("Operator relay announced: {} -> {}", config.operator, new_operator);
    Ok(())
}

/// Permanently close an arena
#[derive(Accounts)]
#[instruction(arena_id: u64)]
pub struct Terminate<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ ArenaError::Unauthorized
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

pub fn terminate(ctx: Context<Terminate>, arena_id: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    let arena = &mut ctx.accounts.arena;

    rules::check_arena_id(arena_id, config.arena_counter).map_err(ArenaError::from)?;
    require!(!arena.terminated, ArenaError::InvalidPhase);

    arena.terminated = true;

    msg!("Arena {} terminated at phase {}", arena.id, arena.phase);
    Ok(())
}
