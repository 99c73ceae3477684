use anchor_lang::prelude::*;

use crate::error::ErrorCode;

/// Global game account, created once at deploy time.
#[account]
#[derive(InitSpace)]
pub struct Arena {
    pub authority: Pubkey,
    /// Id handed to the next minted soldier. Starts at 1; 0 is the "no soldier" sentinel.
    pub next_token_id: u64,
    pub soldiers_minted: u64,
    pub attacks_resolved: u64,
    pub bump: u8,
}

impl Arena {
    /// Reserve the next token id.
    pub fn take_token_id(&mut self) -> Result<u64> {
        let token_id = self.next_token_id;
        self.next_token_id = token_id.checked_add(1).ok_or(ErrorCode::MathOverflow)?;
        self.soldiers_minted = self
            .soldiers_minted
            .checked_add(1)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(token_id)
    }
}
