use anchor_lang::prelude::*;

use crate::constant::{SCORE_INDEX, SOLDIER_CIPHERTEXTS};
use crate::error::ErrorCode;
use crate::state::handles::{CiphertextHandle, StatHandles};

#[account]
#[derive(InitSpace)]
pub struct Soldier {
    /// attack, health, defense, score under the MXE key.
    /// Must stay the first field: circuits read it at SOLDIER_STATE_OFFSET.
    pub state: [[u8; 32]; SOLDIER_CIPHERTEXTS],
    pub state_nonce: u128,
    pub token_id: u64,
    pub owner: Pubkey,
    pub status: SoldierStatus,
    pub attacks: u32,
    pub minted_at: i64,
    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum SoldierStatus {
    Forging,  // mint computation queued
    Ready,
    Battling, // attack computation queued
    Void,     // mint computation aborted
}

impl Soldier {
    /// True once the mint computation has stored the encrypted state.
    pub fn has_state(&self) -> bool {
        matches!(self.status, SoldierStatus::Ready | SoldierStatus::Battling)
    }

    pub fn ensure_has_state(&self) -> Result<()> {
        require!(self.has_state(), ErrorCode::SoldierNotReady);
        Ok(())
    }

    /// Reveals read the stored state by reference when the cluster runs them,
    /// so they must not overlap an attack that is about to replace it.
    pub fn ensure_revealable(&self) -> Result<()> {
        match self.status {
            SoldierStatus::Ready => Ok(()),
            SoldierStatus::Battling => err!(ErrorCode::SoldierBusy),
            _ => err!(ErrorCode::SoldierNotReady),
        }
    }

    pub fn ensure_can_attack(&self) -> Result<()> {
        match self.status {
            SoldierStatus::Ready => Ok(()),
            SoldierStatus::Battling => err!(ErrorCode::SoldierBusy),
            _ => err!(ErrorCode::SoldierNotReady),
        }
    }

    pub fn store_state(&mut self, nonce: u128, ciphertexts: [[u8; 32]; SOLDIER_CIPHERTEXTS]) {
        self.state = ciphertexts;
        self.state_nonce = nonce;
    }

    fn handle(&self, index: usize) -> CiphertextHandle {
        CiphertextHandle {
            ciphertext: self.state[index],
            nonce: self.state_nonce,
        }
    }

    pub fn stat_handles(&self) -> StatHandles {
        StatHandles {
            attack: self.handle(0),
            health: self.handle(1),
            defense: self.handle(2),
        }
    }

    pub fn score_handle(&self) -> CiphertextHandle {
        self.handle(SCORE_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::{SOLDIER_STATE_LEN, SOLDIER_STATE_OFFSET};

    fn code(err: ErrorCode) -> anchor_lang::error::Error {
        err.into()
    }

    fn soldier(status: SoldierStatus) -> Soldier {
        Soldier {
            state: [[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]],
            state_nonce: 99,
            token_id: 1,
            owner: Pubkey::new_from_array([7u8; 32]),
            status,
            attacks: 0,
            minted_at: 0,
            bump: 255,
        }
    }

    #[test]
    fn attack_guard_per_status() {
        assert!(soldier(SoldierStatus::Ready).ensure_can_attack().is_ok());
        assert_eq!(
            soldier(SoldierStatus::Battling).ensure_can_attack().unwrap_err(),
            code(ErrorCode::SoldierBusy)
        );
        assert_eq!(
            soldier(SoldierStatus::Forging).ensure_can_attack().unwrap_err(),
            code(ErrorCode::SoldierNotReady)
        );
        assert_eq!(
            soldier(SoldierStatus::Void).ensure_can_attack().unwrap_err(),
            code(ErrorCode::SoldierNotReady)
        );
    }

    #[test]
    fn reveal_waits_for_pending_attack() {
        assert!(soldier(SoldierStatus::Ready).ensure_revealable().is_ok());
        assert_eq!(
            soldier(SoldierStatus::Battling).ensure_revealable().unwrap_err(),
            code(ErrorCode::SoldierBusy)
        );
        assert_eq!(
            soldier(SoldierStatus::Forging).ensure_revealable().unwrap_err(),
            code(ErrorCode::SoldierNotReady)
        );
        assert_eq!(
            soldier(SoldierStatus::Void).ensure_revealable().unwrap_err(),
            code(ErrorCode::SoldierNotReady)
        );
    }

    #[test]
    fn views_see_state_while_battling() {
        assert!(soldier(SoldierStatus::Ready).has_state());
        assert!(soldier(SoldierStatus::Battling).has_state());
        assert!(!soldier(SoldierStatus::Forging).has_state());
        assert!(soldier(SoldierStatus::Void).ensure_has_state().is_err());
    }

    #[test]
    fn handles_follow_ciphertext_layout() {
        let s = soldier(SoldierStatus::Ready);
        let stats = s.stat_handles();
        assert_eq!(stats.attack.ciphertext, [1u8; 32]);
        assert_eq!(stats.health.ciphertext, [2u8; 32]);
        assert_eq!(stats.defense.ciphertext, [3u8; 32]);
        assert_eq!(s.score_handle().ciphertext, [4u8; 32]);
        assert!([stats.attack, stats.health, stats.defense, s.score_handle()]
            .iter()
            .all(|h| h.nonce == 99));
    }

    #[test]
    fn state_sits_where_circuits_read_it() {
        assert_eq!(SOLDIER_STATE_LEN as usize, 32 * SOLDIER_CIPHERTEXTS);

        let s = soldier(SoldierStatus::Ready);
        let mut data = Vec::new();
        s.try_serialize(&mut data).unwrap();

        let start = SOLDIER_STATE_OFFSET as usize;
        let end = start + SOLDIER_STATE_LEN as usize;
        assert_eq!(&data[..start], Soldier::DISCRIMINATOR);
        assert_eq!(data[start..end].to_vec(), s.state.concat());
    }

    #[test]
    fn store_state_replaces_ciphertexts_and_nonce() {
        let mut s = soldier(SoldierStatus::Battling);
        s.store_state(100, [[9u8; 32]; SOLDIER_CIPHERTEXTS]);
        assert_eq!(s.state_nonce, 100);
        assert_eq!(s.score_handle().ciphertext, [9u8; 32]);
    }
}
