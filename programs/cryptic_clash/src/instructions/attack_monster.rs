use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

use crate::constant::{
    ARENA_SEED, COMP_DEF_OFFSET_ATTACK_MONSTER, SOLDIER_CIPHERTEXTS, SOLDIER_SEED,
    SOLDIER_STATE_LEN, SOLDIER_STATE_OFFSET,
};
use crate::error::ErrorCode;
use crate::events::{AttackAborted, MonsterAttacked};
use crate::state::{Arena, Soldier, SoldierStatus};
use crate::{SignerAccount, ID, ID_CONST};
use arcium_client::idl::arcium::types::CallbackAccount;

#[queue_computation_accounts("attack_monster", payer)]
#[derive(Accounts)]
#[instruction(computation_offset: u64, token_id: u64)]
pub struct AttackMonster<'info> {
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
        address = derive_comp_def_pda!(COMP_DEF_OFFSET_ATTACK_MONSTER)
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
        mut,
        seeds = [SOLDIER_SEED, token_id.to_le_bytes().as_ref()],
        bump = soldier.bump,
        constraint = soldier.owner == payer.key() @ ErrorCode::NotSoldierOwner,
    )]
    pub soldier: Box<Account<'info, Soldier>>,
    #[account(
        seeds = [ARENA_SEED],
        bump = arena.bump,
    )]
    pub arena: Box<Account<'info, Arena>>,
    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("attack_monster")]
#[derive(Accounts)]
pub struct AttackMonsterCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,
    #[account(
        address = derive_comp_def_pda!(COMP_DEF_OFFSET_ATTACK_MONSTER)
    )]
    pub comp_def_account: Account<'info, ComputationDefinitionAccount>,
    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,
    #[account(
        mut,
        constraint = soldier.status == SoldierStatus::Battling @ ErrorCode::SoldierNotReady,
    )]
    pub soldier: Account<'info, Soldier>,
    #[account(
        mut,
        seeds = [ARENA_SEED],
        bump = arena.bump,
    )]
    pub arena: Account<'info, Arena>,
}

/// Queue one fight over the stored encrypted state. The soldier stays
/// `Battling` until the callback lands so two attacks never race on the score.
pub fn handler(ctx: Context<AttackMonster>, computation_offset: u64, token_id: u64) -> Result<()> {
    let soldier = &mut ctx.accounts.soldier;
    soldier.ensure_can_attack()?;
    soldier.status = SoldierStatus::Battling;

    let soldier_key = soldier.key();
    let state_nonce = soldier.state_nonce;

    let arena_key = ctx.accounts.arena.key();

    ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;
    let args = vec![
        Argument::PlaintextU128(state_nonce),
        Argument::Account(soldier_key, SOLDIER_STATE_OFFSET, SOLDIER_STATE_LEN),
    ];
    queue_computation(
        ctx.accounts,
        computation_offset,
        args,
        None,
        vec![AttackMonsterCallback::callback_ix(&[
            CallbackAccount {
                pubkey: soldier_key,
                is_writable: true,
            },
            CallbackAccount {
                pubkey: arena_key,
                is_writable: true,
            },
        ])],
        1,
    )?;

    msg!("Soldier #{} attacks a monster", token_id);
    Ok(())
}

pub fn settle(
    ctx: Context<AttackMonsterCallback>,
    nonce: u128,
    ciphertexts: [[u8; 32]; SOLDIER_CIPHERTEXTS],
) -> Result<()> {
    let soldier = &mut ctx.accounts.soldier;
    soldier.store_state(nonce, ciphertexts);
    soldier.status = SoldierStatus::Ready;
    soldier.attacks = soldier.attacks.checked_add(1).ok_or(ErrorCode::MathOverflow)?;

    let arena = &mut ctx.accounts.arena;
    arena.attacks_resolved = arena
        .attacks_resolved
        .checked_add(1)
        .ok_or(ErrorCode::MathOverflow)?;

    msg!("Soldier #{} fought monster #{}", soldier.token_id, soldier.attacks);
    let score = soldier.score_handle();
    emit!(MonsterAttacked {
        token_id: soldier.token_id,
        owner: soldier.owner,
        attacks: soldier.attacks,
        score: score.ciphertext,
        nonce: score.nonce.to_le_bytes(),
    });
    Ok(())
}

/// Fight never resolved: the score is untouched, the soldier can attack again.
pub fn abort(ctx: Context<AttackMonsterCallback>) -> Result<()> {
    let soldier = &mut ctx.accounts.soldier;
    soldier.status = SoldierStatus::Ready;

    msg!("Soldier #{} attack aborted", soldier.token_id);
    emit!(AttackAborted {
        token_id: soldier.token_id,
        owner: soldier.owner,
    });
    Ok(())
}
