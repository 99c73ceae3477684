use anchor_lang::prelude::*;

use crate::constant::{ARENA_SEED, FIRST_TOKEN_ID};
use crate::events::ArenaInitialized;
use crate::state::Arena;

#[derive(Accounts)]
pub struct InitializeArena<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = 8 + Arena::INIT_SPACE,
        seeds = [ARENA_SEED],
        bump,
    )]
    pub arena: Account<'info, Arena>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeArena>) -> Result<()> {
    let clock = Clock::get()?;
    let arena = &mut ctx.accounts.arena;

    arena.authority = ctx.accounts.authority.key();
    arena.next_token_id = FIRST_TOKEN_ID;
    arena.soldiers_minted = 0;
    arena.attacks_resolved = 0;
    arena.bump = ctx.bumps.arena;

    msg!("Arena initialized by {}", arena.authority);
    emit!(ArenaInitialized {
        authority: arena.authority,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
