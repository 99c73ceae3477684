use anchor_lang::prelude::*;
use clash_rules::WindowError;

#[error_code]
pub enum ErrorCode {
    #[msg("The computation was aborted")]
    AbortedComputation,
    #[msg("Cluster not set")]
    ClusterNotSet,
    #[msg("Wallet already owns a soldier")]
    AlreadyOwnsSoldier,
    #[msg("Signer does not own this soldier")]
    NotSoldierOwner,
    #[msg("Soldier is not ready")]
    SoldierNotReady,
    #[msg("Soldier is already in battle")]
    SoldierBusy,
    #[msg("Decrypt authorization window has not started")]
    DecryptWindowNotStarted,
    #[msg("Decrypt authorization window has expired")]
    DecryptWindowExpired,
    #[msg("Decrypt authorization duration is out of range")]
    InvalidDecryptDuration,
    #[msg("Arithmetic overflow")]
    MathOverflow,
}

impl From<WindowError> for ErrorCode {
    fn from(err: WindowError) -> Self {
        match err {
            WindowError::InvalidDuration { .. } => ErrorCode::InvalidDecryptDuration,
            WindowError::NotStarted { .. } => ErrorCode::DecryptWindowNotStarted,
            WindowError::Expired { .. } => ErrorCode::DecryptWindowExpired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_errors_map_to_program_errors() {
        let cases = [
            (WindowError::InvalidDuration { days: 0 }, ErrorCode::InvalidDecryptDuration),
            (WindowError::NotStarted { starts_at: 10 }, ErrorCode::DecryptWindowNotStarted),
            (WindowError::Expired { expired_at: 10 }, ErrorCode::DecryptWindowExpired),
        ];
        for (window_err, expected) in cases {
            assert_eq!(u32::from(ErrorCode::from(window_err)), u32::from(expected));
        }
    }

    #[test]
    fn codes_start_at_anchor_offset() {
        assert_eq!(u32::from(ErrorCode::AbortedComputation), 6000);
        assert_eq!(u32::from(ErrorCode::SoldierBusy), 6005);
    }
}
