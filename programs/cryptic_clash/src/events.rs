use anchor_lang::prelude::*;

#[event]
pub struct ArenaInitialized {
    pub authority: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct SoldierForging {
    pub token_id: u64,
    pub owner: Pubkey,
}

#[event]
pub struct SoldierMinted {
    pub token_id: u64,
    pub owner: Pubkey,
    pub timestamp: i64,
}

/// Mint computation failed; the owner may mint again.
#[event]
pub struct MintAborted {
    pub token_id: u64,
    pub owner: Pubkey,
}

#[event]
pub struct MonsterAttacked {
    pub token_id: u64,
    pub owner: Pubkey,
    pub attacks: u32,
    /// New score ciphertext under the cluster key
    pub score: [u8; 32],
    pub nonce: [u8; 16],
}

#[event]
pub struct AttackAborted {
    pub token_id: u64,
    pub owner: Pubkey,
}

/// Stats re-encrypted to the requester's ephemeral x25519 key.
#[event]
pub struct StatsRevealed {
    pub token_id: u64,
    pub owner: Pubkey,
    pub encryption_key: [u8; 32],
    pub nonce: [u8; 16],
    pub attack: [u8; 32],
    pub health: [u8; 32],
    pub defense: [u8; 32],
}

#[event]
pub struct ScoreRevealed {
    pub token_id: u64,
    pub owner: Pubkey,
    pub encryption_key: [u8; 32],
    pub nonce: [u8; 16],
    pub score: [u8; 32],
}
