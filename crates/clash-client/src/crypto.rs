//! Key exchange with the cluster and the cipher used for stats and scores.

use anyhow::{ensure, Result};
use rand::{CryptoRng, Rng, RngCore};
use sha2::{Digest, Sha256};
use x25519_dalek::{x25519, X25519_BASEPOINT_BYTES};

const KEYSTREAM_DOMAIN: &[u8] = b"cryptic-clash/keystream/v1";

/// x25519 keypair. Fresh per mint or reveal.
#[derive(Clone)]
pub struct X25519Keypair {
    secret: [u8; 32],
    public: [u8; 32],
}

impl X25519Keypair {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut secret = [0u8; 32];
        rng.fill_bytes(&mut secret);
        Self::from_secret(secret)
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            public: x25519(secret, X25519_BASEPOINT_BYTES),
            secret,
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.public
    }

    pub fn shared_key(&self, peer: &[u8; 32]) -> SharedKey {
        SharedKey(x25519(self.secret, *peer))
    }
}

/// Symmetric key both sides of an x25519 exchange arrive at.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SharedKey(pub [u8; 32]);

pub fn random_nonce<R: Rng>(rng: &mut R) -> u128 {
    rng.gen()
}

/// Cipher over u32 values, one 32-byte ciphertext per value.
pub trait Cipher {
    fn encrypt(&self, key: &SharedKey, nonce: u128, values: &[u32]) -> Vec<[u8; 32]>;

    fn decrypt(&self, key: &SharedKey, nonce: u128, ciphertexts: &[[u8; 32]]) -> Result<Vec<u32>>;
}

/// SHA-256 counter-mode keystream. The local cluster and its clients use it
/// where a deployed cluster uses Rescue.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeystreamCipher;

fn keystream(key: &SharedKey, nonce: u128, index: usize) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(KEYSTREAM_DOMAIN);
    hasher.update(key.0);
    hasher.update(nonce.to_le_bytes());
    hasher.update((index as u64).to_le_bytes());
    hasher.finalize().into()
}

impl Cipher for KeystreamCipher {
    fn encrypt(&self, key: &SharedKey, nonce: u128, values: &[u32]) -> Vec<[u8; 32]> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let mut block = [0u8; 32];
                block[..4].copy_from_slice(&value.to_le_bytes());
                let stream = keystream(key, nonce, i);
                for (b, k) in block.iter_mut().zip(stream) {
                    *b ^= k;
                }
                block
            })
            .collect()
    }

    fn decrypt(&self, key: &SharedKey, nonce: u128, ciphertexts: &[[u8; 32]]) -> Result<Vec<u32>> {
        ciphertexts
            .iter()
            .enumerate()
            .map(|(i, ct)| {
                let stream = keystream(key, nonce, i);
                let mut block = *ct;
                for (b, k) in block.iter_mut().zip(stream) {
                    *b ^= k;
                }
                // a wrong key or nonce leaves garbage in the padding
                ensure!(
                    block[4..].iter().all(|b| *b == 0),
                    "ciphertext {} does not decrypt under this key",
                    i
                );
                Ok(u32::from_le_bytes([block[0], block[1], block[2], block[3]]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn both_sides_agree_on_shared_key() {
        let mut rng = StdRng::seed_from_u64(1);
        let client = X25519Keypair::generate(&mut rng);
        let cluster = X25519Keypair::generate(&mut rng);
        assert!(
            client.shared_key(&cluster.public_key()) == cluster.shared_key(&client.public_key())
        );
    }

    #[test]
    fn decrypts_with_matching_key_and_nonce() {
        let key = SharedKey([5u8; 32]);
        let cts = KeystreamCipher.encrypt(&key, 11, &[40, 30, 30]);
        assert_eq!(KeystreamCipher.decrypt(&key, 11, &cts).unwrap(), vec![40, 30, 30]);
    }

    #[test]
    fn stale_nonce_is_detected() {
        let key = SharedKey([5u8; 32]);
        let cts = KeystreamCipher.encrypt(&key, 11, &[7]);
        assert!(KeystreamCipher.decrypt(&key, 12, &cts).is_err());
        assert!(KeystreamCipher.decrypt(&SharedKey([6u8; 32]), 11, &cts).is_err());
    }

    #[test]
    fn equal_values_encrypt_differently() {
        let key = SharedKey([5u8; 32]);
        let cts = KeystreamCipher.encrypt(&key, 1, &[30, 30]);
        assert_ne!(cts[0], cts[1]);
    }
}
