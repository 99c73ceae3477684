use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

use crate::constant::{COMP_DEF_OFFSET_REVEAL_STATS, SOLDIER_SEED, SOLDIER_STATE_LEN, SOLDIER_STATE_OFFSET};
use crate::error::ErrorCode;
use crate::events::StatsRevealed;
use crate::instructions::authorize_reveal;
use crate::state::Soldier;
use crate::{SignerAccount, ID, ID_CONST};
use arcium_client::idl::arcium::types::CallbackAccount;

#[queue_computation_accounts("reveal_stats", payer)]
#[derive(Accounts)]
#[instruction(computation_offset: u64, token_id: u64)]
pub struct RevealStats<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(
        init_if_needed,
        space = 9,
        payer = payer,
        seeds = [&SIGN_PDA_SEED],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Account<'info, SignerAccount>,
    #[account(
        address = derive_mxe_pda!()
    )]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(
        mut,
        address = derive_mempool_pda!()
    )]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,
    #[account(
        mut,
        address = derive_execpool_pda!()
    )]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,
    #[account(
        mut,
        address = derive_comp_pda!(computation_offset)
    )]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,
    #[account(
        address = derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_STATS)
    )]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,
    #[account(
        mut,
        address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    pub cluster_account: Box<Account<'info, Cluster>>,
    #[account(
        mut,
        address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
    )]
    pub pool_account: Box<Account<'info, FeePool>>,
    #[account(
        address = ARCIUM_CLOCK_ACCOUNT_ADDRESS
    )]
    pub clock_account: Box<Account<'info, ClockAccount>>,
    #[account(
        seeds = [SOLDIER_SEED, token_id.to_le_bytes().as_ref()],
        bump = soldier.bump,
    )]
    pub soldier: Box<Account<'info, Soldier>>,
    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("reveal_stats")]
#[derive(Accounts)]
pub struct RevealStatsCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,
    #[account(
        address = derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_STATS)
    )]
    pub comp_def_account: Account<'info, ComputationDefinitionAccount>,
    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,
    pub soldier: Account<'info, Soldier>,
}

/// Re-encrypt attack, health and defense to the requester's ephemeral key.
/// Only the owner may ask, and only inside the window they signed for.
#[allow(clippy::too_many_arguments)]
pub fn handler(
    ctx: Context<RevealStats>,
    computation_offset: u64,
    token_id: u64,
    pub_key: [u8; 32],
    nonce: u128,
    window_start: i64,
    window_days: u32,
) -> Result<()> {
    let soldier = &ctx.accounts.soldier;
    authorize_reveal(soldier, &ctx.accounts.payer.key(), window_start, window_days)?;

    let soldier_key = soldier.key();
    let args = vec![
        Argument::PlaintextU128(soldier.state_nonce),
        Argument::Account(soldier_key, SOLDIER_STATE_OFFSET, SOLDIER_STATE_LEN),
        Argument::ArcisPubkey(pub_key),
        Argument::PlaintextU128(nonce),
    ];

    ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;
    queue_computation(
        ctx.accounts,
        computation_offset,
        args,
        None,
        vec![RevealStatsCallback::callback_ix(&[CallbackAccount {
            pubkey: soldier_key,
            is_writable: false,
        }])],
        1,
    )?;

    msg!("Stats reveal queued for soldier #{}", token_id);
    Ok(())
}

pub fn settle(
    ctx: Context<RevealStatsCallback>,
    encryption_key: [u8; 32],
    nonce: u128,
    ciphertexts: [[u8; 32]; 3],
) -> Result<()> {
    let soldier = &ctx.accounts.soldier;
    emit!(StatsRevealed {
        token_id: soldier.token_id,
        owner: soldier.owner,
        encryption_key,
        nonce: nonce.to_le_bytes(),
        attack: ciphertexts[0],
        health: ciphertexts[1],
        defense: ciphertexts[2],
    });
    Ok(())
}
