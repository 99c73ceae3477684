use arcium_anchor::prelude::*;

pub const ARENA_SEED: &[u8] = b"arena";
pub const SOLDIER_SEED: &[u8] = b"soldier";
pub const OWNER_SEED: &[u8] = b"owner";

pub const COMP_DEF_OFFSET_MINT_SOLDIER: u32 = comp_def_offset("mint_soldier");
pub const COMP_DEF_OFFSET_ATTACK_MONSTER: u32 = comp_def_offset("attack_monster");
pub const COMP_DEF_OFFSET_REVEAL_STATS: u32 = comp_def_offset("reveal_stats");
pub const COMP_DEF_OFFSET_REVEAL_SCORE: u32 = comp_def_offset("reveal_score");

/// Ciphertexts per soldier: attack, health, defense, score.
pub const SOLDIER_CIPHERTEXTS: usize = 4;
pub const SCORE_INDEX: usize = 3;
/// Encrypted state sits right after the 8-byte account discriminator.
pub const SOLDIER_STATE_OFFSET: u32 = 8;
pub const SOLDIER_STATE_LEN: u32 = 32 * SOLDIER_CIPHERTEXTS as u32;

/// Token id 0 means "no soldier".
pub const NO_TOKEN: u64 = 0;
pub const FIRST_TOKEN_ID: u64 = 1;
