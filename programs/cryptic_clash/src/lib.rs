use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

pub mod constant;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

pub use instructions::*;

use crate::error::ErrorCode;
use crate::state::{CiphertextHandle, StatHandles};

// Custom getrandom backend for Solana BPF target (getrandom 0.3.x)
// When getrandom_backend="custom" is set via rustflags, getrandom expects this function
#[no_mangle]
unsafe extern "Rust" fn __getrandom_v03_custom(_dest: *mut u8, _len: usize) -> u32 {
    // UNSUPPORTED: on-chain randomness comes from the MXE cluster, never from here
    1
}

declare_id!("8BcVZDdFujQ9QVAKuRtmA6QdBifKCmuBtqpvQ1GKqncd");

#[arcium_program]
pub mod cryptic_clash {
    use super::*;

    // ============================================
    // DEPLOYMENT
    // ============================================

    /// Create the global arena. Run once after deploy.
    pub fn initialize_arena(ctx: Context<InitializeArena>) -> Result<()> {
        instructions::initialize_arena::handler(ctx)
    }

    pub fn init_mint_soldier_comp_def(ctx: Context<InitMintSoldierCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, 0, None, None)?;
        Ok(())
    }

    pub fn init_attack_monster_comp_def(ctx: Context<InitAttackMonsterCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, 0, None, None)?;
        Ok(())
    }

    pub fn init_reveal_stats_comp_def(ctx: Context<InitRevealStatsCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, 0, None, None)?;
        Ok(())
    }

    pub fn init_reveal_score_comp_def(ctx: Context<InitRevealScoreCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, 0, None, None)?;
        Ok(())
    }

    // ============================================
    // MINT_SOLDIER
    // ============================================

    /// Mint the caller's soldier from three client-encrypted stats.
    ///
    /// # Arguments
    /// * `computation_offset` - Unique offset for this computation
    /// * `attack_ct`, `health_ct`, `defense_ct` - u32 ciphertexts under the client's shared secret
    /// * `pub_key` - client x25519 public key used for encryption
    /// * `nonce` - nonce used for encryption
    /// * `mxe_nonce` - fresh nonce for the cluster-owned state
    #[allow(clippy::too_many_arguments)]
    pub fn mint_soldier(
        ctx: Context<MintSoldier>,
        computation_offset: u64,
        attack_ct: [u8; 32],
        health_ct: [u8; 32],
        defense_ct: [u8; 32],
        pub_key: [u8; 32],
        nonce: u128,
        mxe_nonce: u128,
    ) -> Result<()> {
        instructions::mint_soldier::handler(
            ctx,
            computation_offset,
            attack_ct,
            health_ct,
            defense_ct,
            pub_key,
            nonce,
            mxe_nonce,
        )
    }

    #[arcium_callback(encrypted_ix = "mint_soldier")]
    pub fn mint_soldier_callback(
        ctx: Context<MintSoldierCallback>,
        output: ComputationOutputs<MintSoldierOutput>,
    ) -> Result<()> {
        let o = match output {
            ComputationOutputs::Success(MintSoldierOutput { field_0 }) => field_0,
            _ => return instructions::mint_soldier::abort(ctx),
        };
        instructions::mint_soldier::settle(ctx, o.nonce, o.ciphertexts)
    }

    // ============================================
    // ATTACK_MONSTER
    // ============================================

    pub fn attack_monster(
        ctx: Context<AttackMonster>,
        computation_offset: u64,
        token_id: u64,
    ) -> Result<()> {
        instructions::attack_monster::handler(ctx, computation_offset, token_id)
    }

    #[arcium_callback(encrypted_ix = "attack_monster")]
    pub fn attack_monster_callback(
        ctx: Context<AttackMonsterCallback>,
        output: ComputationOutputs<AttackMonsterOutput>,
    ) -> Result<()> {
        let o = match output {
            ComputationOutputs::Success(AttackMonsterOutput { field_0 }) => field_0,
            _ => return instructions::attack_monster::abort(ctx),
        };
        instructions::attack_monster::settle(ctx, o.nonce, o.ciphertexts)
    }

    // ============================================
    // USER DECRYPTION
    // ============================================

    /// Ask the cluster to re-encrypt the stats to `pub_key`.
    /// The owner's transaction signature plus `[window_start, window_start + window_days)`
    /// is the authorization.
    #[allow(clippy::too_many_arguments)]
    pub fn reveal_stats(
        ctx: Context<RevealStats>,
        computation_offset: u64,
        token_id: u64,
        pub_key: [u8; 32],
        nonce: u128,
        window_start: i64,
        window_days: u32,
    ) -> Result<()> {
        instructions::reveal_stats::handler(
            ctx,
            computation_offset,
            token_id,
            pub_key,
            nonce,
            window_start,
            window_days,
        )
    }

    #[arcium_callback(encrypted_ix = "reveal_stats")]
    pub fn reveal_stats_callback(
        ctx: Context<RevealStatsCallback>,
        output: ComputationOutputs<RevealStatsOutput>,
    ) -> Result<()> {
        let o = match output {
            ComputationOutputs::Success(RevealStatsOutput { field_0 }) => field_0,
            _ => return Err(ErrorCode::AbortedComputation.into()),
        };
        instructions::reveal_stats::settle(ctx, o.encryption_key, o.nonce, o.ciphertexts)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reveal_score(
        ctx: Context<RevealScore>,
        computation_offset: u64,
        token_id: u64,
        pub_key: [u8; 32],
        nonce: u128,
        window_start: i64,
        window_days: u32,
    ) -> Result<()> {
        instructions::reveal_score::handler(
            ctx,
            computation_offset,
            token_id,
            pub_key,
            nonce,
            window_start,
            window_days,
        )
    }

    #[arcium_callback(encrypted_ix = "reveal_score")]
    pub fn reveal_score_callback(
        ctx: Context<RevealScoreCallback>,
        output: ComputationOutputs<RevealScoreOutput>,
    ) -> Result<()> {
        let o = match output {
            ComputationOutputs::Success(RevealScoreOutput { field_0 }) => field_0,
            _ => return Err(ErrorCode::AbortedComputation.into()),
        };
        instructions::reveal_score::settle(ctx, o.encryption_key, o.nonce, o.ciphertexts[0])
    }

    // ============================================
    // VIEWS
    // ============================================

    /// Token id held by `wallet`, or 0 when it has no soldier.
    pub fn get_owned_token(ctx: Context<GetOwnedToken>, wallet: Pubkey) -> Result<u64> {
        instructions::views::owned_token(ctx, wallet)
    }

    pub fn get_soldier_stats(ctx: Context<GetSoldier>, token_id: u64) -> Result<StatHandles> {
        instructions::views::soldier_stats(ctx, token_id)
    }

    pub fn get_encrypted_score(
        ctx: Context<GetSoldier>,
        token_id: u64,
    ) -> Result<CiphertextHandle> {
        instructions::views::encrypted_score(ctx, token_id)
    }
}
