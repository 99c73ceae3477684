use anchor_lang::{AnchorDeserialize, Event};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Prefix `emit!` puts in front of each base64 event payload.
pub const PROGRAM_DATA: &str = "Program data: ";

/// Log line carrying `event`, as the runtime records an `emit!`.
pub fn encode_event<E: Event>(event: &E) -> String {
    format!("{}{}", PROGRAM_DATA, STANDARD.encode(event.data()))
}

pub fn decode_event<E: Event>(bytes: &[u8]) -> Option<E> {
    let mut body = bytes.strip_prefix(E::DISCRIMINATOR)?;
    E::deserialize(&mut body).ok()
}

/// First `E` among the transaction logs.
pub fn find_event<E: Event>(logs: &[String]) -> Option<E> {
    logs.iter()
        .filter_map(|line| line.strip_prefix(PROGRAM_DATA))
        .filter_map(|payload| STANDARD.decode(payload.trim()).ok())
        .find_map(|bytes| decode_event(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::prelude::Pubkey;
    use cryptic_clash::events::{MintAborted, SoldierMinted};

    #[test]
    fn finds_event_among_logs() {
        let minted = SoldierMinted {
            token_id: 3,
            owner: Pubkey::new_from_array([4u8; 32]),
            timestamp: 1_700_000_000,
        };
        let logs = vec![
            "Program log: Soldier #3 minted".to_string(),
            encode_event(&minted),
        ];

        let found: SoldierMinted = find_event(&logs).unwrap();
        assert_eq!(found.token_id, 3);
        assert_eq!(found.owner, minted.owner);
    }

    #[test]
    fn other_events_do_not_match() {
        let logs = vec![encode_event(&MintAborted {
            token_id: 3,
            owner: Pubkey::new_from_array([4u8; 32]),
        })];
        assert!(find_event::<SoldierMinted>(&logs).is_none());
    }
}
