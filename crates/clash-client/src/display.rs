use cryptic_clash::state::CiphertextHandle;

/// Placeholder shown for values that are not available yet.
pub const EMPTY: &str = "—";

/// `0x1234ab...9f8e7d` style abbreviation of a long hex value.
pub fn short_handle(value: &str) -> String {
    if value.is_empty() {
        return EMPTY.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 14 {
        return value.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Ciphertext of a handle as `0x`-prefixed hex.
pub fn handle_hex(handle: &CiphertextHandle) -> String {
    format!("0x{}", hex::encode(handle.ciphertext))
}

fn anchor_error(err: &anyhow::Error) -> Option<&anchor_lang::error::Error> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<anchor_lang::error::Error>())
}

/// Program error number carried by `err`, if the program raised it.
pub fn error_code(err: &anyhow::Error) -> Option<u32> {
    match anchor_error(err)? {
        anchor_lang::error::Error::AnchorError(ae) => Some(ae.error_code_number),
        anchor_lang::error::Error::ProgramError(_) => None,
    }
}

/// One-line message for the user, falling back when the error has no text.
/// Program errors show their message, others their root cause.
pub fn short_message(err: &anyhow::Error, fallback: &str) -> String {
    let msg = match anchor_error(err) {
        Some(anchor_lang::error::Error::AnchorError(ae)) => ae.error_msg.clone(),
        _ => err.root_cause().to_string(),
    };
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptic_clash::error::ErrorCode;

    #[test]
    fn shortens_long_handles() {
        let handle = format!("0x{}", "ab".repeat(32));
        assert_eq!(short_handle(&handle), "0xababab...ababab");
    }

    #[test]
    fn keeps_short_values() {
        assert_eq!(short_handle("0x1234"), "0x1234");
        assert_eq!(short_handle(""), EMPTY);
    }

    #[test]
    fn handle_hex_covers_whole_ciphertext() {
        let handle = CiphertextHandle {
            ciphertext: [0xab; 32],
            nonce: 1,
        };
        assert_eq!(handle_hex(&handle), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn short_message_uses_root_cause() {
        let err = anyhow::anyhow!("arena is not initialized").context("minting failed");
        assert_eq!(short_message(&err, "Minting failed."), "arena is not initialized");
    }

    #[test]
    fn short_message_prefers_program_message() {
        let err = anyhow::Error::from(anchor_lang::error::Error::from(ErrorCode::SoldierBusy))
            .context("attack failed");
        assert_eq!(short_message(&err, "Attack failed."), "Soldier is already in battle");
        assert_eq!(error_code(&err), Some(u32::from(ErrorCode::SoldierBusy)));
    }

    #[test]
    fn short_message_falls_back() {
        let err = anyhow::anyhow!("  ");
        assert_eq!(short_message(&err, "Attack failed."), "Attack failed.");
        assert_eq!(error_code(&err), None);
    }
}
