//! Instructions for the `cryptic_clash` program, built from its generated
//! account and argument types.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::InstructionData;
use arcium_anchor::prelude::*;
use cryptic_clash::constant::{
    ARENA_SEED, COMP_DEF_OFFSET_ATTACK_MONSTER, COMP_DEF_OFFSET_MINT_SOLDIER,
    COMP_DEF_OFFSET_REVEAL_SCORE, COMP_DEF_OFFSET_REVEAL_STATS, OWNER_SEED, SOLDIER_SEED,
};
use cryptic_clash::{accounts, instruction, ID, ID_CONST};

pub fn arena_address(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[ARENA_SEED], program_id).0
}

pub fn soldier_address(program_id: &Pubkey, token_id: u64) -> Pubkey {
    Pubkey::find_program_address(&[SOLDIER_SEED, token_id.to_le_bytes().as_ref()], program_id).0
}

pub fn owner_address(program_id: &Pubkey, wallet: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[OWNER_SEED, wallet.as_ref()], program_id).0
}

/// Arcium computation account for `computation_offset`.
pub fn computation_address(computation_offset: u64) -> Pubkey {
    derive_comp_pda!(computation_offset)
}

/// Arcium accounts every queueing instruction passes. Derived for the
/// program id this crate was built against.
#[derive(Clone, Copy, Debug)]
pub struct QueueAccounts {
    pub sign_pda: Pubkey,
    pub mxe: Pubkey,
    pub mempool: Pubkey,
    pub execpool: Pubkey,
    pub cluster: Pubkey,
}

impl QueueAccounts {
    pub fn new(cluster: Pubkey) -> Self {
        Self {
            sign_pda: derive_sign_pda!(),
            mxe: derive_mxe_pda!(),
            mempool: derive_mempool_pda!(),
            execpool: derive_execpool_pda!(),
            cluster,
        }
    }
}

/// Client-encrypted stats for `mint_soldier`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SealedStats {
    pub pub_key: [u8; 32],
    pub nonce: u128,
    pub attack: [u8; 32],
    pub health: [u8; 32],
    pub defense: [u8; 32],
}

/// Where a reveal is re-encrypted to and for how long the owner allows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealRequest {
    pub pub_key: [u8; 32],
    pub nonce: u128,
    pub window_start: i64,
    pub window_days: u32,
}

pub fn initialize_arena(program_id: &Pubkey, authority: Pubkey) -> Instruction {
    let accounts = accounts::InitializeArena {
        authority,
        arena: arena_address(program_id),
        system_program: System::id(),
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::InitializeArena.data(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn mint_soldier(
    program_id: &Pubkey,
    queue: &QueueAccounts,
    payer: Pubkey,
    token_id: u64,
    computation_offset: u64,
    stats: &SealedStats,
    mxe_nonce: u128,
) -> Instruction {
    let accounts = accounts::MintSoldier {
        payer,
        sign_pda_account: queue.sign_pda,
        mxe_account: queue.mxe,
        mempool_account: queue.mempool,
        executing_pool: queue.execpool,
        computation_account: computation_address(computation_offset),
        comp_def_account: derive_comp_def_pda!(COMP_DEF_OFFSET_MINT_SOLDIER),
        cluster_account: queue.cluster,
        pool_account: ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
        clock_account: ARCIUM_CLOCK_ACCOUNT_ADDRESS,
        arena: arena_address(program_id),
        soldier: soldier_address(program_id, token_id),
        owner_record: owner_address(program_id, &payer),
        system_program: System::id(),
        arcium_program: Arcium::id(),
    };
    let args = instruction::MintSoldier {
        computation_offset,
        attack_ct: stats.attack,
        health_ct: stats.health,
        defense_ct: stats.defense,
        pub_key: stats.pub_key,
        nonce: stats.nonce,
        mxe_nonce,
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: args.data(),
    }
}

pub fn attack_monster(
    program_id: &Pubkey,
    queue: &QueueAccounts,
    payer: Pubkey,
    computation_offset: u64,
    token_id: u64,
) -> Instruction {
    let accounts = accounts::AttackMonster {
        payer,
        sign_pda_account: queue.sign_pda,
        mxe_account: queue.mxe,
        mempool_account: queue.mempool,
        executing_pool: queue.execpool,
        computation_account: computation_address(computation_offset),
        comp_def_account: derive_comp_def_pda!(COMP_DEF_OFFSET_ATTACK_MONSTER),
        cluster_account: queue.cluster,
        pool_account: ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
        clock_account: ARCIUM_CLOCK_ACCOUNT_ADDRESS,
        soldier: soldier_address(program_id, token_id),
        arena: arena_address(program_id),
        system_program: System::id(),
        arcium_program: Arcium::id(),
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::AttackMonster {
            computation_offset,
            token_id,
        }
        .data(),
    }
}

pub fn reveal_stats(
    program_id: &Pubkey,
    queue: &QueueAccounts,
    payer: Pubkey,
    computation_offset: u64,
    token_id: u64,
    request: &RevealRequest,
) -> Instruction {
    let accounts = accounts::RevealStats {
        payer,
        sign_pda_account: queue.sign_pda,
        mxe_account: queue.mxe,
        mempool_account: queue.mempool,
        executing_pool: queue.execpool,
        computation_account: computation_address(computation_offset),
        comp_def_account: derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_STATS),
        cluster_account: queue.cluster,
        pool_account: ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
        clock_account: ARCIUM_CLOCK_ACCOUNT_ADDRESS,
        soldier: soldier_address(program_id, token_id),
        system_program: System::id(),
        arcium_program: Arcium::id(),
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::RevealStats {
            computation_offset,
            token_id,
            pub_key: request.pub_key,
            nonce: request.nonce,
            window_start: request.window_start,
            window_days: request.window_days,
        }
        .data(),
    }
}

pub fn reveal_score(
    program_id: &Pubkey,
    queue: &QueueAccounts,
    payer: Pubkey,
    computation_offset: u64,
    token_id: u64,
    request: &RevealRequest,
) -> Instruction {
    let accounts = accounts::RevealScore {
        payer,
        sign_pda_account: queue.sign_pda,
        mxe_account: queue.mxe,
        mempool_account: queue.mempool,
        executing_pool: queue.execpool,
        computation_account: computation_address(computation_offset),
        comp_def_account: derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_SCORE),
        cluster_account: queue.cluster,
        pool_account: ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
        clock_account: ARCIUM_CLOCK_ACCOUNT_ADDRESS,
        soldier: soldier_address(program_id, token_id),
        system_program: System::id(),
        arcium_program: Arcium::id(),
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::RevealScore {
            computation_offset,
            token_id,
            pub_key: request.pub_key,
            nonce: request.nonce,
            window_start: request.window_start,
            window_days: request.window_days,
        }
        .data(),
    }
}

/// `owner_record` is `None` when the wallet has never minted.
pub fn get_owned_token(
    program_id: &Pubkey,
    wallet: Pubkey,
    owner_record: Option<Pubkey>,
) -> Instruction {
    let accounts = accounts::GetOwnedToken { owner_record };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::GetOwnedToken { wallet }.data(),
    }
}

pub fn get_soldier_stats(program_id: &Pubkey, token_id: u64) -> Instruction {
    let accounts = accounts::GetSoldier {
        soldier: soldier_address(program_id, token_id),
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::GetSoldierStats { token_id }.data(),
    }
}

pub fn get_encrypted_score(program_id: &Pubkey, token_id: u64) -> Instruction {
    let accounts = accounts::GetSoldier {
        soldier: soldier_address(program_id, token_id),
    };
    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::GetEncryptedScore { token_id }.data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> QueueAccounts {
        QueueAccounts::new(Pubkey::new_from_array([5u8; 32]))
    }

    #[test]
    fn mint_targets_next_soldier_and_payer_record() {
        let payer = Pubkey::new_from_array([1u8; 32]);
        let stats = SealedStats {
            pub_key: [2u8; 32],
            nonce: 3,
            attack: [4u8; 32],
            health: [5u8; 32],
            defense: [6u8; 32],
        };
        let ix = mint_soldier(&ID, &queue(), payer, 7, 99, &stats, 8);

        assert_eq!(ix.program_id, ID);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].pubkey == payer);
        let keys: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert!(keys.contains(&soldier_address(&ID, 7)));
        assert!(keys.contains(&owner_address(&ID, &payer)));
        assert!(keys.contains(&arena_address(&ID)));
        assert_eq!(&ix.data[..8], instruction::MintSoldier::DISCRIMINATOR);

        let args = instruction::MintSoldier::try_from_slice(&ix.data[8..]).unwrap();
        assert_eq!(args.computation_offset, 99);
        assert_eq!(args.health_ct, [5u8; 32]);
        assert_eq!(args.mxe_nonce, 8);
    }

    #[test]
    fn owned_token_without_record_passes_program_id() {
        let wallet = Pubkey::new_from_array([1u8; 32]);
        let ix = get_owned_token(&ID, wallet, None);
        assert_eq!(ix.accounts.len(), 1);
        assert_eq!(ix.accounts[0].pubkey, ID);
    }

    #[test]
    fn soldier_addresses_differ_per_token() {
        assert_ne!(soldier_address(&ID, 1), soldier_address(&ID, 2));
        assert_ne!(
            owner_address(&ID, &Pubkey::new_from_array([1u8; 32])),
            owner_address(&ID, &Pubkey::new_from_array([2u8; 32]))
        );
    }
}
