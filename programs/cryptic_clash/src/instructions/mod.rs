pub mod attack_monster;
pub mod init_comp_defs;
pub mod initialize_arena;
pub mod mint_soldier;
pub mod reveal_score;
pub mod reveal_stats;
pub mod views;

pub use attack_monster::*;
pub use init_comp_defs::*;
pub use initialize_arena::*;
pub use mint_soldier::*;
pub use reveal_score::*;
pub use reveal_stats::*;
pub use views::*;

use anchor_lang::prelude::*;
use clash_rules::DecryptWindow;

use crate::error::ErrorCode;
use crate::state::Soldier;

/// Checks shared by both reveal paths: the signer owns a settled soldier
/// and the decrypt window covers the current time.
pub(crate) fn authorize_reveal(
    soldier: &Soldier,
    requester: &Pubkey,
    window_start: i64,
    window_days: u32,
) -> Result<()> {
    require_keys_eq!(soldier.owner, *requester, ErrorCode::NotSoldierOwner);
    soldier.ensure_revealable()?;

    let now = Clock::get()?.unix_timestamp;
    DecryptWindow::new(window_start, window_days)
        .check(now)
        .map_err(ErrorCode::from)?;
    Ok(())
}
