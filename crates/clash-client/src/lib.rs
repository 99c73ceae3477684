//! Client side of Cryptic Clash: instruction builders for the
//! `cryptic_clash` program, the x25519 handshake with the cluster, and the
//! task sequences behind the command-line tasks.
//!
//! A cluster is reached through [`Transport`]. [`local::LocalCluster`] runs
//! the program and its circuits in-process for local development and tests.

pub mod client;
pub mod crypto;
pub mod display;
pub mod events;
pub mod local;
pub mod program;
pub mod tasks;
pub mod transport;
pub mod wallet;

pub use client::ClashClient;
pub use crypto::{Cipher, KeystreamCipher, SharedKey, X25519Keypair};
pub use local::LocalCluster;
pub use program::{RevealRequest, SealedStats};
pub use transport::{MxeInfo, SignedInstruction, Transport, TxReceipt};
pub use wallet::Wallet;

pub use anchor_lang::prelude::Pubkey;
pub use clash_rules::{DecryptWindow, StatAllocation};
