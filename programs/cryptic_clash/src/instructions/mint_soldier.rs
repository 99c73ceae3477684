use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

use crate::constant::{
    ARENA_SEED, COMP_DEF_OFFSET_MINT_SOLDIER, OWNER_SEED, SOLDIER_CIPHERTEXTS, SOLDIER_SEED,
};
use crate::error::ErrorCode;
use crate::events::{MintAborted, SoldierForging, SoldierMinted};
use crate::state::{Arena, OwnerRecord, Soldier, SoldierStatus};
use crate::{SignerAccount, ID, ID_CONST};
use arcium_client::idl::arcium::types::CallbackAccount;

#[queue_computation_accounts("mint_soldier", payer)]
#[derive(Accounts)]
#[instruction(computation_offset: u64)]
pub struct MintSoldier<'info> {
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
        address = derive_comp_def_pda!(COMP_DEF_OFFSET_MINT_SOLDIER)
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
        seeds = [ARENA_SEED],
        bump = arena.bump,
    )]
    pub arena: Box<Account<'info, Arena>>,
    #[account(
        init,
        payer = payer,
        space = 8 + Soldier::INIT_SPACE,
        seeds = [SOLDIER_SEED, arena.next_token_id.to_le_bytes().as_ref()],
        bump,
    )]
    pub soldier: Box<Account<'info, Soldier>>,
    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + OwnerRecord::INIT_SPACE,
        seeds = [OWNER_SEED, payer.key().as_ref()],
        bump,
    )]
    pub owner_record: Box<Account<'info, OwnerRecord>>,
    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("mint_soldier")]
#[derive(Accounts)]
pub struct MintSoldierCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,
    #[account(
        address = derive_comp_def_pda!(COMP_DEF_OFFSET_MINT_SOLDIER)
    )]
    pub comp_def_account: Account<'info, ComputationDefinitionAccount>,
    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,
    #[account(
        mut,
        constraint = soldier.status == SoldierStatus::Forging @ ErrorCode::SoldierNotReady,
    )]
    pub soldier: Account<'info, Soldier>,
    #[account(
        mut,
        seeds = [OWNER_SEED, soldier.owner.as_ref()],
        bump = owner_record.bump,
    )]
    pub owner_record: Account<'info, OwnerRecord>,
}

/// Record the new soldier and queue re-encryption of its stats to the cluster.
/// `pub_key` and `nonce` bind the three ciphertexts to the minter's shared secret.
/// Stats are opaque here, so the 100-point budget is only enforced by clients.
#[allow(clippy::too_many_arguments)]
pub fn handler(
    ctx: Context<MintSoldier>,
    computation_offset: u64,
    attack_ct: [u8; 32],
    health_ct: [u8; 32],
    defense_ct: [u8; 32],
    pub_key: [u8; 32],
    nonce: u128,
    mxe_nonce: u128,
) -> Result<()> {
    let owner = ctx.accounts.payer.key();
    let owner_record = &mut ctx.accounts.owner_record;
    require!(!owner_record.has_soldier(), ErrorCode::AlreadyOwnsSoldier);

    let token_id = ctx.accounts.arena.take_token_id()?;
    let clock = Clock::get()?;

    owner_record.wallet = owner;
    owner_record.token_id = token_id;
    owner_record.bump = ctx.bumps.owner_record;

    let soldier = &mut ctx.accounts.soldier;
    soldier.state = [[0u8; 32]; SOLDIER_CIPHERTEXTS];
    soldier.state_nonce = 0;
    soldier.token_id = token_id;
    soldier.owner = owner;
    soldier.status = SoldierStatus::Forging;
    soldier.attacks = 0;
    soldier.minted_at = clock.unix_timestamp;
    soldier.bump = ctx.bumps.soldier;

    let soldier_key = soldier.key();
    let owner_record_key = owner_record.key();

    ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;
    let args = vec![
        Argument::ArcisPubkey(pub_key),
        Argument::PlaintextU128(nonce),
        Argument::EncryptedU32(attack_ct),
        Argument::EncryptedU32(health_ct),
        Argument::EncryptedU32(defense_ct),
        Argument::PlaintextU128(mxe_nonce),
    ];
    queue_computation(
        ctx.accounts,
        computation_offset,
        args,
        None,
        vec![MintSoldierCallback::callback_ix(&[
            CallbackAccount {
                pubkey: soldier_key,
                is_writable: true,
            },
            CallbackAccount {
                pubkey: owner_record_key,
                is_writable: true,
            },
        ])],
        1,
    )?;

    msg!("Soldier #{} forging for {}", token_id, owner);
    emit!(SoldierForging { token_id, owner });
    Ok(())
}

/// Store the cluster-encrypted state. Score ciphertext is an encryption of zero.
pub fn settle(
    ctx: Context<MintSoldierCallback>,
    nonce: u128,
    ciphertexts: [[u8; 32]; SOLDIER_CIPHERTEXTS],
) -> Result<()> {
    let soldier = &mut ctx.accounts.soldier;
    soldier.store_state(nonce, ciphertexts);
    soldier.status = SoldierStatus::Ready;

    msg!("Soldier #{} minted", soldier.token_id);
    emit!(SoldierMinted {
        token_id: soldier.token_id,
        owner: soldier.owner,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

/// The cluster gave up on the mint: retire the token and free the wallet.
pub fn abort(ctx: Context<MintSoldierCallback>) -> Result<()> {
    let soldier = &mut ctx.accounts.soldier;
    soldier.status = SoldierStatus::Void;

    ctx.accounts.owner_record.release(soldier.token_id);

    msg!("Soldier #{} mint aborted", soldier.token_id);
    emit!(MintAborted {
        token_id: soldier.token_id,
        owner: soldier.owner,
    });
    Ok(())
}
