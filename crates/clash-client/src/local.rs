//! In-process cluster running the `cryptic_clash` program and its circuits.
//!
//! Accounts are stored as the bytes the program would write, instructions
//! are decoded from their Anchor encoding, and queued computations sit in a
//! pool until [`Transport::await_computation`] runs them and lands the
//! callback. Circuits use [`KeystreamCipher`] where a deployed cluster uses
//! Rescue.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anchor_lang::error::ErrorCode as AnchorErrorCode;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::{Discriminator, Event};
use anyhow::{anyhow, bail, ensure, Context, Result};
use clash_rules::{apply_reward, attack_reward, DecryptWindow};
use cryptic_clash::constant::{
    ARENA_SEED, FIRST_TOKEN_ID, NO_TOKEN, OWNER_SEED, SOLDIER_CIPHERTEXTS, SOLDIER_SEED,
};
use cryptic_clash::error::ErrorCode;
use cryptic_clash::events::{
    ArenaInitialized, AttackAborted, MintAborted, MonsterAttacked, ScoreRevealed, SoldierForging,
    SoldierMinted, StatsRevealed,
};
use cryptic_clash::instruction;
use cryptic_clash::state::{Arena, OwnerRecord, Soldier, SoldierStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::program_error;
use crate::crypto::{Cipher, KeystreamCipher, SharedKey, X25519Keypair};
use crate::events::encode_event;
use crate::program::{arena_address, computation_address, owner_address, soldier_address};
use crate::transport::{MxeInfo, SignedInstruction, Transport, TxReceipt};
use crate::wallet::Wallet;

/// Computation waiting in the pool, with the arguments the program queued.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
enum Pending {
    Mint {
        soldier: Pubkey,
        owner_record: Pubkey,
        pub_key: [u8; 32],
        nonce: u128,
        stats: [[u8; 32]; 3],
        mxe_nonce: u128,
    },
    Attack {
        soldier: Pubkey,
        arena: Pubkey,
        state_nonce: u128,
    },
    RevealStats {
        soldier: Pubkey,
        state_nonce: u128,
        pub_key: [u8; 32],
        nonce: u128,
    },
    RevealScore {
        soldier: Pubkey,
        state_nonce: u128,
        pub_key: [u8; 32],
        nonce: u128,
    },
}

/// Everything that survives between CLI runs.
#[derive(AnchorSerialize, AnchorDeserialize)]
struct Snapshot {
    program_id: Pubkey,
    seed: u64,
    now: i64,
    tx_count: u64,
    mxe_secret: [u8; 32],
    cluster: Pubkey,
    accounts: BTreeMap<Pubkey, Vec<u8>>,
    pending: BTreeMap<u64, Pending>,
}

struct State {
    snapshot: Snapshot,
    rng: StdRng,
    fail_next: bool,
}

pub struct LocalCluster {
    program_id: Pubkey,
    mxe: X25519Keypair,
    state: Mutex<State>,
}

/// Derive the wallet a local cluster funds at `index`.
pub fn dev_wallet(index: u8) -> Wallet {
    let mut hasher = Sha256::new();
    hasher.update(b"cryptic-clash/dev-wallet");
    hasher.update([index]);
    Wallet::from_secret(hasher.finalize().into())
}

impl LocalCluster {
    /// Deterministic cluster with `program_id` deployed, clock at `now`.
    pub fn new(program_id: Pubkey, seed: u64, now: i64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mxe_secret: [u8; 32] = rng.gen();
        let cluster = Pubkey::new_from_array(rng.gen());
        Self::from_snapshot(Snapshot {
            program_id,
            seed,
            now,
            tx_count: 0,
            mxe_secret,
            cluster,
            accounts: BTreeMap::new(),
            pending: BTreeMap::new(),
        })
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        let rng = StdRng::seed_from_u64(snapshot.seed.wrapping_add(snapshot.tx_count));
        Self {
            program_id: snapshot.program_id,
            mxe: X25519Keypair::from_secret(snapshot.mxe_secret),
            state: Mutex::new(State {
                snapshot,
                rng,
                fail_next: false,
            }),
        }
    }

    /// Cluster saved at `path`, or a fresh one when the file does not exist.
    pub fn open(path: &Path, program_id: Pubkey, now: i64) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "starting a new local cluster");
            return Ok(Self::new(program_id, rand::thread_rng().gen(), now));
        }
        let bytes =
            fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let snapshot = Snapshot::try_from_slice(&bytes)
            .with_context(|| format!("{} is not a cluster snapshot", path.display()))?;
        let cluster = Self::from_snapshot(snapshot);
        if cluster.now() < now {
            cluster.set_time(now);
        }
        Ok(cluster)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let bytes = self.lock().snapshot.try_to_vec()?;
        fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn now(&self) -> i64 {
        self.lock().snapshot.now
    }

    pub fn set_time(&self, now: i64) {
        self.lock().snapshot.now = now;
    }

    pub fn advance(&self, seconds: i64) {
        let mut state = self.lock();
        state.snapshot.now = state.snapshot.now.saturating_add(seconds);
    }

    /// The next computation to finish aborts instead of producing output.
    pub fn fail_next_computation(&self) {
        self.lock().fail_next = true;
    }

    pub fn pending_computations(&self) -> usize {
        self.lock().snapshot.pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a poisoned lock only means a test panicked mid-call; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Key the cluster keeps soldier state under.
    fn state_key(&self) -> SharedKey {
        self.mxe.shared_key(&self.mxe.public_key())
    }
}

fn anchor_error(code: AnchorErrorCode) -> anyhow::Error {
    anchor_lang::error::Error::from(code).into()
}

fn args<I: AnchorDeserialize + Discriminator>(data: &[u8]) -> Option<I> {
    let mut body = data.strip_prefix(I::DISCRIMINATOR)?;
    I::deserialize(&mut body).ok()
}

fn log(logs: &mut Vec<String>, msg: String) {
    logs.push(format!("Program log: {}", msg));
}

fn emit<E: Event>(logs: &mut Vec<String>, event: &E) {
    logs.push(encode_event(event));
}

/// The account the program expects must be passed, or seeds do not match.
fn expect_account(ix: &Instruction, expected: &Pubkey) -> Result<()> {
    if ix.accounts.iter().any(|meta| meta.pubkey == *expected) {
        Ok(())
    } else {
        Err(anchor_error(AnchorErrorCode::ConstraintSeeds))
    }
}

fn circuit_nonce(nonce: u128) -> u128 {
    nonce.wrapping_add(1)
}

fn to_state(ciphertexts: Vec<[u8; 32]>) -> Result<[[u8; 32]; SOLDIER_CIPHERTEXTS]> {
    ciphertexts
        .try_into()
        .map_err(|_| anyhow!("circuit produced the wrong number of ciphertexts"))
}

impl Snapshot {
    fn load<A: AccountDeserialize>(&self, address: &Pubkey) -> Result<Option<A>> {
        match self.accounts.get(address) {
            Some(data) => Ok(Some(A::try_deserialize(&mut data.as_slice())?)),
            None => Ok(None),
        }
    }

    fn require<A: AccountDeserialize>(&self, address: &Pubkey) -> Result<A> {
        self.load(address)?
            .ok_or_else(|| anchor_error(AnchorErrorCode::AccountNotInitialized))
    }

    fn store<A: AccountSerialize>(&mut self, address: Pubkey, account: &A) -> Result<()> {
        let mut data = Vec::new();
        account.try_serialize(&mut data)?;
        self.accounts.insert(address, data);
        Ok(())
    }

    fn ensure_uninitialized(&self, address: &Pubkey) -> Result<()> {
        ensure!(
            !self.accounts.contains_key(address),
            "account {} already in use",
            address
        );
        Ok(())
    }

    fn queue(&mut self, computation_offset: u64, pending: Pending) -> Result<()> {
        ensure!(
            !self.pending.contains_key(&computation_offset),
            "computation offset {} already in use",
            computation_offset
        );
        self.pending.insert(computation_offset, pending);
        Ok(())
    }

    fn receipt(&mut self, seed: &[u8], logs: Vec<String>) -> TxReceipt {
        self.tx_count += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.tx_count.to_le_bytes());
        hasher.update(seed);
        TxReceipt {
            signature: hex::encode(hasher.finalize()),
            logs,
        }
    }
}

impl LocalCluster {
    fn execute(&self, db: &mut Snapshot, signer: Pubkey, ix: &Instruction) -> Result<Vec<String>> {
        let pid = self.program_id;
        let now = db.now;
        let mut logs = Vec::new();

        if args::<instruction::InitializeArena>(&ix.data).is_some() {
            let address = arena_address(&pid);
            expect_account(ix, &address)?;
            db.ensure_uninitialized(&address)?;
            let arena = Arena {
                authority: signer,
                next_token_id: FIRST_TOKEN_ID,
                soldiers_minted: 0,
                attacks_resolved: 0,
                bump: Pubkey::find_program_address(&[ARENA_SEED], &pid).1,
            };
            db.store(address, &arena)?;
            log(&mut logs, format!("Arena initialized by {}", signer));
            emit(
                &mut logs,
                &ArenaInitialized {
                    authority: signer,
                    timestamp: now,
                },
            );
        } else if let Some(a) = args::<instruction::MintSoldier>(&ix.data) {
            expect_account(ix, &computation_address(a.computation_offset))?;
            let arena_key = arena_address(&pid);
            let mut arena: Arena = db.require(&arena_key)?;
            let soldier_key = soldier_address(&pid, arena.next_token_id);
            let record_key = owner_address(&pid, &signer);
            expect_account(ix, &soldier_key)?;
            expect_account(ix, &record_key)?;
            db.ensure_uninitialized(&soldier_key)?;

            let mut record = db.load::<OwnerRecord>(&record_key)?.unwrap_or(OwnerRecord {
                wallet: signer,
                token_id: NO_TOKEN,
                bump: Pubkey::find_program_address(&[OWNER_SEED, signer.as_ref()], &pid).1,
            });
            if record.has_soldier() {
                return Err(program_error(ErrorCode::AlreadyOwnsSoldier));
            }
            let token_id = arena.take_token_id()?;
            record.wallet = signer;
            record.token_id = token_id;

            let soldier = Soldier {
                state: [[0u8; 32]; SOLDIER_CIPHERTEXTS],
                state_nonce: 0,
                token_id,
                owner: signer,
                status: SoldierStatus::Forging,
                attacks: 0,
                minted_at: now,
                bump: Pubkey::find_program_address(
                    &[SOLDIER_SEED, token_id.to_le_bytes().as_ref()],
                    &pid,
                )
                .1,
            };

            db.queue(
                a.computation_offset,
                Pending::Mint {
                    soldier: soldier_key,
                    owner_record: record_key,
                    pub_key: a.pub_key,
                    nonce: a.nonce,
                    stats: [a.attack_ct, a.health_ct, a.defense_ct],
                    mxe_nonce: a.mxe_nonce,
                },
            )?;
            db.store(arena_key, &arena)?;
            db.store(record_key, &record)?;
            db.store(soldier_key, &soldier)?;
            log(&mut logs, format!("Soldier #{} forging for {}", token_id, signer));
            emit(
                &mut logs,
                &SoldierForging {
                    token_id,
                    owner: signer,
                },
            );
        } else if let Some(a) = args::<instruction::AttackMonster>(&ix.data) {
            expect_account(ix, &computation_address(a.computation_offset))?;
            let soldier_key = soldier_address(&pid, a.token_id);
            let arena_key = arena_address(&pid);
            expect_account(ix, &soldier_key)?;
            let mut soldier: Soldier = db.require(&soldier_key)?;
            db.require::<Arena>(&arena_key)?;
            if soldier.owner != signer {
                return Err(program_error(ErrorCode::NotSoldierOwner));
            }
            soldier.ensure_can_attack()?;
            soldier.status = SoldierStatus::Battling;

            db.queue(
                a.computation_offset,
                Pending::Attack {
                    soldier: soldier_key,
                    arena: arena_key,
                    state_nonce: soldier.state_nonce,
                },
            )?;
            db.store(soldier_key, &soldier)?;
            log(&mut logs, format!("Soldier #{} attacks a monster", a.token_id));
        } else if let Some(a) = args::<instruction::RevealStats>(&ix.data) {
            expect_account(ix, &computation_address(a.computation_offset))?;
            let soldier_key = soldier_address(&pid, a.token_id);
            expect_account(ix, &soldier_key)?;
            let soldier: Soldier = db.require(&soldier_key)?;
            authorize_reveal(&soldier, &signer, a.window_start, a.window_days, now)?;
            db.queue(
                a.computation_offset,
                Pending::RevealStats {
                    soldier: soldier_key,
                    state_nonce: soldier.state_nonce,
                    pub_key: a.pub_key,
                    nonce: a.nonce,
                },
            )?;
            log(&mut logs, format!("Stats reveal queued for soldier #{}", a.token_id));
        } else if let Some(a) = args::<instruction::RevealScore>(&ix.data) {
            expect_account(ix, &computation_address(a.computation_offset))?;
            let soldier_key = soldier_address(&pid, a.token_id);
            expect_account(ix, &soldier_key)?;
            let soldier: Soldier = db.require(&soldier_key)?;
            authorize_reveal(&soldier, &signer, a.window_start, a.window_days, now)?;
            db.queue(
                a.computation_offset,
                Pending::RevealScore {
                    soldier: soldier_key,
                    state_nonce: soldier.state_nonce,
                    pub_key: a.pub_key,
                    nonce: a.nonce,
                },
            )?;
            log(&mut logs, format!("Score reveal queued for soldier #{}", a.token_id));
        } else {
            return Err(anchor_error(AnchorErrorCode::InstructionFallbackNotFound));
        }
        Ok(logs)
    }

    /// Run the circuit for `pending`. `None` when the computation aborts.
    fn compute(&self, db: &Snapshot, pending: &Pending, rng: &mut StdRng) -> Option<Output> {
        let state_key = self.state_key();
        match pending {
            Pending::Mint {
                pub_key,
                nonce,
                stats,
                mxe_nonce,
                ..
            } => {
                let shared = self.mxe.shared_key(pub_key);
                let s = KeystreamCipher.decrypt(&shared, *nonce, stats).ok()?;
                let nonce = circuit_nonce(*mxe_nonce);
                let cts = KeystreamCipher.encrypt(&state_key, nonce, &[s[0], s[1], s[2], 0]);
                Some(Output::State(nonce, to_state(cts).ok()?))
            }
            Pending::Attack {
                soldier,
                state_nonce,
                ..
            } => {
                let soldier: Soldier = db.load(soldier).ok()??;
                let mut s = KeystreamCipher
                    .decrypt(&state_key, *state_nonce, &soldier.state)
                    .ok()?;
                let strong: bool = rng.gen();
                s[3] = apply_reward(s[3], attack_reward(s[1], strong));
                let nonce = circuit_nonce(*state_nonce);
                let cts = KeystreamCipher.encrypt(&state_key, nonce, &s);
                Some(Output::State(nonce, to_state(cts).ok()?))
            }
            Pending::RevealStats {
                soldier,
                state_nonce,
                pub_key,
                nonce,
            }
            | Pending::RevealScore {
                soldier,
                state_nonce,
                pub_key,
                nonce,
            } => {
                let soldier: Soldier = db.load(soldier).ok()??;
                let s = KeystreamCipher
                    .decrypt(&state_key, *state_nonce, &soldier.state)
                    .ok()?;
                let values = match pending {
                    Pending::RevealStats { .. } => vec![s[0], s[1], s[2]],
                    _ => vec![s[3]],
                };
                let shared = self.mxe.shared_key(pub_key);
                let nonce = circuit_nonce(*nonce);
                Some(Output::Shared(
                    *pub_key,
                    nonce,
                    KeystreamCipher.encrypt(&shared, nonce, &values),
                ))
            }
        }
    }

    /// Land the callback for `pending` with the circuit output.
    fn callback(
        &self,
        db: &mut Snapshot,
        pending: &Pending,
        output: Option<Output>,
    ) -> Result<Vec<String>> {
        let now = db.now;
        let mut logs = Vec::new();
        match (pending, output) {
            (
                Pending::Mint {
                    soldier: key,
                    owner_record,
                    ..
                },
                output,
            ) => {
                let mut soldier: Soldier = db.require(key)?;
                if soldier.status != SoldierStatus::Forging {
                    return Err(program_error(ErrorCode::SoldierNotReady));
                }
                match output {
                    Some(Output::State(nonce, cts)) => {
                        soldier.store_state(nonce, cts);
                        soldier.status = SoldierStatus::Ready;
                        log(&mut logs, format!("Soldier #{} minted", soldier.token_id));
                        emit(
                            &mut logs,
                            &SoldierMinted {
                                token_id: soldier.token_id,
                                owner: soldier.owner,
                                timestamp: now,
                            },
                        );
                    }
                    _ => {
                        soldier.status = SoldierStatus::Void;
                        let mut record: OwnerRecord = db.require(owner_record)?;
                        record.release(soldier.token_id);
                        db.store(*owner_record, &record)?;
                        log(&mut logs, format!("Soldier #{} mint aborted", soldier.token_id));
                        emit(
                            &mut logs,
                            &MintAborted {
                                token_id: soldier.token_id,
                                owner: soldier.owner,
                            },
                        );
                    }
                }
                db.store(*key, &soldier)?;
            }
            (Pending::Attack { soldier: key, arena, .. }, output) => {
                let mut soldier: Soldier = db.require(key)?;
                if soldier.status != SoldierStatus::Battling {
                    return Err(program_error(ErrorCode::SoldierNotReady));
                }
                soldier.status = SoldierStatus::Ready;
                match output {
                    Some(Output::State(nonce, cts)) => {
                        soldier.store_state(nonce, cts);
                        soldier.attacks = soldier
                            .attacks
                            .checked_add(1)
                            .ok_or_else(|| program_error(ErrorCode::MathOverflow))?;
                        let mut a: Arena = db.require(arena)?;
                        a.attacks_resolved = a
                            .attacks_resolved
                            .checked_add(1)
                            .ok_or_else(|| program_error(ErrorCode::MathOverflow))?;
                        db.store(*arena, &a)?;
                        log(
                            &mut logs,
                            format!(
                                "Soldier #{} fought monster #{}",
                                soldier.token_id, soldier.attacks
                            ),
                        );
                        let score = soldier.score_handle();
                        emit(
                            &mut logs,
                            &MonsterAttacked {
                                token_id: soldier.token_id,
                                owner: soldier.owner,
                                attacks: soldier.attacks,
                                score: score.ciphertext,
                                nonce: score.nonce.to_le_bytes(),
                            },
                        );
                    }
                    _ => {
                        log(&mut logs, format!("Soldier #{} attack aborted", soldier.token_id));
                        emit(
                            &mut logs,
                            &AttackAborted {
                                token_id: soldier.token_id,
                                owner: soldier.owner,
                            },
                        );
                    }
                }
                db.store(*key, &soldier)?;
            }
            (Pending::RevealStats { soldier, .. }, Some(Output::Shared(key, nonce, cts)))
                if cts.len() == 3 =>
            {
                let soldier: Soldier = db.require(soldier)?;
                emit(
                    &mut logs,
                    &StatsRevealed {
                        token_id: soldier.token_id,
                        owner: soldier.owner,
                        encryption_key: key,
                        nonce: nonce.to_le_bytes(),
                        attack: cts[0],
                        health: cts[1],
                        defense: cts[2],
                    },
                );
            }
            (Pending::RevealScore { soldier, .. }, Some(Output::Shared(key, nonce, cts)))
                if cts.len() == 1 =>
            {
                let soldier: Soldier = db.require(soldier)?;
                emit(
                    &mut logs,
                    &ScoreRevealed {
                        token_id: soldier.token_id,
                        owner: soldier.owner,
                        encryption_key: key,
                        nonce: nonce.to_le_bytes(),
                        score: cts[0],
                    },
                );
            }
            _ => return Err(program_error(ErrorCode::AbortedComputation)),
        }
        Ok(logs)
    }

    fn view(&self, db: &Snapshot, ix: &Instruction) -> Result<Vec<u8>> {
        let pid = self.program_id;
        if let Some(a) = args::<instruction::GetOwnedToken>(&ix.data) {
            let meta = ix
                .accounts
                .first()
                .ok_or_else(|| anchor_error(AnchorErrorCode::AccountNotEnoughKeys))?;
            // optional accounts are passed as the program id when absent
            if meta.pubkey == pid {
                return Ok(NO_TOKEN.try_to_vec()?);
            }
            if meta.pubkey != owner_address(&pid, &a.wallet) {
                return Err(anchor_error(AnchorErrorCode::ConstraintSeeds));
            }
            let record: OwnerRecord = db.require(&meta.pubkey)?;
            if record.wallet != a.wallet {
                return Err(anchor_error(AnchorErrorCode::RequireKeysEqViolated));
            }
            Ok(record.token_id.try_to_vec()?)
        } else if let Some(a) = args::<instruction::GetSoldierStats>(&ix.data) {
            let soldier = self.viewed_soldier(db, ix, a.token_id)?;
            Ok(soldier.stat_handles().try_to_vec()?)
        } else if let Some(a) = args::<instruction::GetEncryptedScore>(&ix.data) {
            let soldier = self.viewed_soldier(db, ix, a.token_id)?;
            Ok(soldier.score_handle().try_to_vec()?)
        } else {
            Err(anchor_error(AnchorErrorCode::InstructionFallbackNotFound))
        }
    }

    fn viewed_soldier(&self, db: &Snapshot, ix: &Instruction, token_id: u64) -> Result<Soldier> {
        let key = soldier_address(&self.program_id, token_id);
        expect_account(ix, &key)?;
        let soldier: Soldier = db.require(&key)?;
        if soldier.token_id != token_id {
            return Err(anchor_error(AnchorErrorCode::RequireEqViolated));
        }
        soldier.ensure_has_state()?;
        Ok(soldier)
    }
}

enum Output {
    /// Soldier state re-encrypted to the cluster.
    State(u128, [[u8; 32]; SOLDIER_CIPHERTEXTS]),
    /// Values encrypted to a requester key.
    Shared([u8; 32], u128, Vec<[u8; 32]>),
}

fn authorize_reveal(
    soldier: &Soldier,
    requester: &Pubkey,
    window_start: i64,
    window_days: u32,
    now: i64,
) -> Result<()> {
    if soldier.owner != *requester {
        return Err(program_error(ErrorCode::NotSoldierOwner));
    }
    soldier.ensure_revealable()?;
    DecryptWindow::new(window_start, window_days)
        .check(now)
        .map_err(|e| program_error(ErrorCode::from(e)))
}

impl Transport for LocalCluster {
    fn mxe(&self) -> Result<MxeInfo> {
        Ok(MxeInfo {
            public_key: self.mxe.public_key(),
            cluster: self.lock().snapshot.cluster,
        })
    }

    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().snapshot.accounts.get(address).cloned())
    }

    fn send(&self, tx: SignedInstruction) -> Result<TxReceipt> {
        ensure!(tx.verify(), "transaction signature verification failed");
        if tx.instruction.program_id != self.program_id {
            bail!(
                "program {} is not deployed on this cluster",
                tx.instruction.program_id
            );
        }

        let mut state = self.lock();
        let logs = self.execute(&mut state.snapshot, tx.signer, &tx.instruction)?;
        debug!(signer = %tx.signer, logs = logs.len(), "transaction landed");
        Ok(state.snapshot.receipt(&tx.signature, logs))
    }

    fn await_computation(&self, computation_offset: u64) -> Result<TxReceipt> {
        let mut state = self.lock();
        let pending = state
            .snapshot
            .pending
            .remove(&computation_offset)
            .ok_or_else(|| anyhow!("no computation queued at offset {}", computation_offset))?;

        let output = if std::mem::take(&mut state.fail_next) {
            None
        } else {
            let State { snapshot, rng, .. } = &mut *state;
            self.compute(snapshot, &pending, rng)
        };
        debug!(
            computation_offset,
            aborted = output.is_none(),
            "computation finalized"
        );
        let logs = self.callback(&mut state.snapshot, &pending, output)?;
        Ok(state
            .snapshot
            .receipt(&computation_offset.to_le_bytes(), logs))
    }

    fn simulate(&self, instruction: Instruction) -> Result<Vec<u8>> {
        if instruction.program_id != self.program_id {
            bail!(
                "program {} is not deployed on this cluster",
                instruction.program_id
            );
        }
        self.view(&self.lock().snapshot, &instruction)
    }

    fn unix_timestamp(&self) -> Result<i64> {
        Ok(self.now())
    }
}
