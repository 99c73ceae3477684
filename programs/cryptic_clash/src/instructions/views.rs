use anchor_lang::prelude::*;

use crate::constant::{NO_TOKEN, OWNER_SEED, SOLDIER_SEED};
use crate::state::{CiphertextHandle, OwnerRecord, Soldier, StatHandles};

#[derive(Accounts)]
#[instruction(wallet: Pubkey)]
pub struct GetOwnedToken<'info> {
    /// Absent for wallets that never minted.
    #[account(
        seeds = [OWNER_SEED, wallet.as_ref()],
        bump,
    )]
    pub owner_record: Option<Account<'info, OwnerRecord>>,
}

#[derive(Accounts)]
#[instruction(token_id: u64)]
pub struct GetSoldier<'info> {
    #[account(
        seeds = [SOLDIER_SEED, token_id.to_le_bytes().as_ref()],
        bump = soldier.bump,
    )]
    pub soldier: Account<'info, Soldier>,
}

pub fn owned_token(ctx: Context<GetOwnedToken>, wallet: Pubkey) -> Result<u64> {
    match ctx.accounts.owner_record.as_ref() {
        Some(record) => {
            require_keys_eq!(record.wallet, wallet);
            Ok(record.token_id)
        }
        None => Ok(NO_TOKEN),
    }
}

pub fn soldier_stats(ctx: Context<GetSoldier>, token_id: u64) -> Result<StatHandles> {
    let soldier = &ctx.accounts.soldier;
    require_eq!(soldier.token_id, token_id);
    soldier.ensure_has_state()?;
    Ok(soldier.stat_handles())
}

pub fn encrypted_score(ctx: Context<GetSoldier>, token_id: u64) -> Result<CiphertextHandle> {
    let soldier = &ctx.accounts.soldier;
    require_eq!(soldier.token_id, token_id);
    soldier.ensure_has_state()?;
    Ok(soldier.score_handle())
}
