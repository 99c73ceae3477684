use anchor_lang::prelude::*;

/// Reference to a value held encrypted by the MXE cluster. Not the plaintext.
/// Changes every time the value is re-encrypted.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CiphertextHandle {
    pub ciphertext: [u8; 32],
    pub nonce: u128,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatHandles {
    pub attack: CiphertextHandle,
    pub health: CiphertextHandle,
    pub defense: CiphertextHandle,
}
