use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use anyhow::Result;

use crate::wallet::{verify_signature, Wallet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub signature: String,
    pub logs: Vec<String>,
}

/// The cluster's x25519 key and the cluster account that runs its computations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MxeInfo {
    pub public_key: [u8; 32],
    pub cluster: Pubkey,
}

/// One instruction, signed by the wallet that pays for it.
#[derive(Clone, Debug)]
pub struct SignedInstruction {
    pub instruction: Instruction,
    pub signer: Pubkey,
    pub signature: [u8; 64],
}

impl SignedInstruction {
    pub fn new(instruction: Instruction, wallet: &Wallet) -> Self {
        let signature = wallet.sign(&message_bytes(&instruction));
        Self {
            instruction,
            signer: wallet.address(),
            signature,
        }
    }

    /// Signature is valid and every account that must sign is the signer.
    pub fn verify(&self) -> bool {
        let signers_match = self
            .instruction
            .accounts
            .iter()
            .filter(|meta| meta.is_signer)
            .all(|meta| meta.pubkey == self.signer);
        signers_match
            && verify_signature(
                &self.signer,
                &message_bytes(&self.instruction),
                &self.signature,
            )
    }
}

fn message_bytes(ix: &Instruction) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + 34 * ix.accounts.len() + ix.data.len());
    out.extend_from_slice(ix.program_id.as_ref());
    for meta in &ix.accounts {
        out.extend_from_slice(meta.pubkey.as_ref());
        out.push(meta.is_signer as u8);
        out.push(meta.is_writable as u8);
    }
    out.extend_from_slice(&ix.data);
    out
}

/// Connection to a cluster running the program.
pub trait Transport {
    fn mxe(&self) -> Result<MxeInfo>;

    /// Raw data of the account at `address`, `None` if it does not exist.
    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Land the transaction. Fails with the program error if it reverts.
    fn send(&self, tx: SignedInstruction) -> Result<TxReceipt>;

    /// Block until the computation queued at `computation_offset` is
    /// finalized and return the receipt of its callback transaction.
    fn await_computation(&self, computation_offset: u64) -> Result<TxReceipt>;

    /// Run `instruction` without landing it and return its return data.
    fn simulate(&self, instruction: Instruction) -> Result<Vec<u8>>;

    /// Cluster clock.
    fn unix_timestamp(&self) -> Result<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::prelude::AccountMeta;

    fn instruction(signer: Pubkey) -> Instruction {
        Instruction {
            program_id: Pubkey::new_from_array([9u8; 32]),
            accounts: vec![
                AccountMeta::new(signer, true),
                AccountMeta::new_readonly(Pubkey::new_from_array([8u8; 32]), false),
            ],
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn signed_instruction_verifies() {
        let wallet = Wallet::from_secret([1u8; 32]);
        let tx = SignedInstruction::new(instruction(wallet.address()), &wallet);
        assert!(tx.verify());
    }

    #[test]
    fn tampered_data_fails() {
        let wallet = Wallet::from_secret([1u8; 32]);
        let mut tx = SignedInstruction::new(instruction(wallet.address()), &wallet);
        tx.instruction.data[0] = 7;
        assert!(!tx.verify());
    }

    #[test]
    fn signer_must_match_signing_account() {
        let alice = Wallet::from_secret([1u8; 32]);
        let bob = Wallet::from_secret([2u8; 32]);
        let tx = SignedInstruction::new(instruction(alice.address()), &bob);
        assert!(!tx.verify());
    }
}
