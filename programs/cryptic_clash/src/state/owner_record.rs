use anchor_lang::prelude::*;

use crate::constant::NO_TOKEN;

/// Which soldier a wallet currently holds.
#[account]
#[derive(InitSpace)]
pub struct OwnerRecord {
    pub wallet: Pubkey,
    pub token_id: u64,
    pub bump: u8,
}

impl OwnerRecord {
    pub fn has_soldier(&self) -> bool {
        self.token_id != NO_TOKEN
    }

    /// Forget `token_id` if it is the soldier this wallet holds.
    pub fn release(&mut self, token_id: u64) {
        if self.token_id == token_id {
            self.token_id = NO_TOKEN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(token_id: u64) -> OwnerRecord {
        OwnerRecord {
            wallet: Pubkey::new_from_array([3u8; 32]),
            token_id,
            bump: 253,
        }
    }

    #[test]
    fn fresh_record_holds_nothing() {
        assert!(!record(NO_TOKEN).has_soldier());
        assert!(record(4).has_soldier());
    }

    #[test]
    fn aborted_mint_frees_the_wallet() {
        let mut r = record(4);
        r.release(4);
        assert_eq!(r.token_id, NO_TOKEN);
        assert!(!r.has_soldier());
    }

    #[test]
    fn release_ignores_other_tokens() {
        let mut r = record(5);
        r.release(4);
        assert_eq!(r.token_id, 5);
    }
}
