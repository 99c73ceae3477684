use anchor_lang::prelude::Pubkey;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// An ed25519 wallet. Its address is the verifying key.
pub struct Wallet {
    key: SigningKey,
}

impl Wallet {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn address(&self) -> Pubkey {
        Pubkey::new_from_array(self.key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

/// Check an ed25519 signature made by the wallet at `address`.
pub fn verify_signature(address: &Pubkey, message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(&address.to_bytes()) else {
        return false;
    };
    key.verify(message, &Signature::from_bytes(signature)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_verifies_only_for_signer() {
        let alice = Wallet::from_secret([1u8; 32]);
        let bob = Wallet::from_secret([2u8; 32]);
        let sig = alice.sign(b"hello");

        assert!(verify_signature(&alice.address(), b"hello", &sig));
        assert!(!verify_signature(&bob.address(), b"hello", &sig));
        assert!(!verify_signature(&alice.address(), b"hellp", &sig));
    }
}
