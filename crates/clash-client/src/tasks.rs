use anchor_lang::prelude::Pubkey;
use anyhow::{anyhow, ensure, Context, Result};
use clash_rules::{DecryptWindow, StatAllocation};
use cryptic_clash::events::MonsterAttacked;
use rand::{CryptoRng, Rng, RngCore};
use tracing::{debug, info};

use crate::client::ClashClient;
use crate::crypto::{random_nonce, Cipher, X25519Keypair};
use crate::display::{handle_hex, short_handle};
use crate::program::{RevealRequest, SealedStats};
use crate::transport::Transport;
use crate::wallet::Wallet;

/// Lifetime of a decrypt authorization when the caller does not pick one.
pub const DEFAULT_DECRYPT_DAYS: u32 = 7;

/// A window opening at the cluster's current time.
pub fn window_from_now<T: Transport>(client: &ClashClient<T>, days: u32) -> Result<DecryptWindow> {
    Ok(DecryptWindow::new(client.unix_timestamp()?, days))
}

pub fn address<T: Transport>(client: &ClashClient<T>) -> Pubkey {
    let program_id = client.program_id();
    info!("CrypticClash address is {}", program_id);
    program_id
}

/// Create the arena if it does not exist yet.
pub fn deploy<T: Transport>(client: &ClashClient<T>, authority: &Wallet) -> Result<()> {
    if client.arena()?.is_some() {
        debug!("arena already initialized");
        return Ok(());
    }
    let receipt = client
        .initialize_arena(authority)
        .context("arena initialization failed")?;
    info!(authority = %authority.address(), "Arena initialized: {}", receipt.signature);
    Ok(())
}

/// Encrypt the allocation to the cluster and mint. Returns the new token id.
///
/// The allocation is checked here, before anything is encrypted: the program
/// cannot see the plaintexts and does not enforce the 100-point budget.
pub fn mint_soldier<T, C, R>(
    client: &ClashClient<T>,
    cipher: &C,
    rng: &mut R,
    wallet: &Wallet,
    allocation: StatAllocation,
) -> Result<u64>
where
    T: Transport,
    C: Cipher,
    R: RngCore + CryptoRng,
{
    allocation.validate()?;

    let mxe = client.mxe()?;
    let keypair = X25519Keypair::generate(rng);
    let nonce = random_nonce(rng);
    let [attack, health, defense]: [[u8; 32]; 3] = cipher
        .encrypt(&keypair.shared_key(&mxe.public_key), nonce, &allocation.values())
        .try_into()
        .map_err(|_| anyhow!("encryption failed"))?;
    let stats = SealedStats {
        pub_key: keypair.public_key(),
        nonce,
        attack,
        health,
        defense,
    };

    let offset: u64 = rng.gen();
    let (token_id, receipt) = client
        .queue_mint_soldier(wallet, offset, &stats, random_nonce(rng))
        .context("minting failed")?;
    info!("Wait for tx:{}...", receipt.signature);

    let minted = client.settle_mint(offset).context("minting failed")?;
    ensure!(
        minted.token_id == token_id,
        "callback minted soldier #{} instead of #{}",
        minted.token_id,
        token_id
    );
    info!(token_id, owner = %minted.owner, "Soldier minted successfully.");
    Ok(token_id)
}

pub fn attack<T, R>(
    client: &ClashClient<T>,
    rng: &mut R,
    wallet: &Wallet,
    token_id: u64,
) -> Result<MonsterAttacked>
where
    T: Transport,
    R: RngCore,
{
    let offset: u64 = rng.gen();
    let receipt = client
        .queue_attack(wallet, offset, token_id)
        .context("attack failed")?;
    info!("Wait for tx:{}...", receipt.signature);

    let attacked = client.settle_attack(offset).context("attack failed")?;
    info!(token_id, attacks = attacked.attacks, "Monster attacked.");
    Ok(attacked)
}

/// Fresh key and nonce the cluster re-encrypts a reveal to.
fn reveal_request<R: RngCore + CryptoRng>(
    rng: &mut R,
    window: DecryptWindow,
) -> (X25519Keypair, RevealRequest) {
    let keypair = X25519Keypair::generate(rng);
    let request = RevealRequest {
        pub_key: keypair.public_key(),
        nonce: random_nonce(rng),
        window_start: window.start_time,
        window_days: window.duration_days,
    };
    (keypair, request)
}

/// Decrypt attack, health and defense for the wallet's soldier.
pub fn decrypt_stats<T, C, R>(
    client: &ClashClient<T>,
    cipher: &C,
    rng: &mut R,
    wallet: &Wallet,
    token_id: u64,
    window: DecryptWindow,
) -> Result<StatAllocation>
where
    T: Transport,
    C: Cipher,
    R: RngCore + CryptoRng,
{
    let handles = client.soldier_stats(token_id)?;
    debug!(
        attack = %short_handle(&handle_hex(&handles.attack)),
        health = %short_handle(&handle_hex(&handles.health)),
        defense = %short_handle(&handle_hex(&handles.defense)),
        "stat handles"
    );

    let (keypair, request) = reveal_request(rng, window);
    debug!(
        start = window.start_time,
        days = window.duration_days,
        "requesting stat reveal"
    );
    let offset: u64 = rng.gen();
    let receipt = client
        .queue_reveal_stats(wallet, offset, token_id, &request)
        .context("stat decryption failed")?;
    info!("Wait for tx:{}...", receipt.signature);

    let revealed = client
        .settle_reveal_stats(offset)
        .context("stat decryption failed")?;
    ensure!(
        revealed.encryption_key == keypair.public_key(),
        "stats were revealed to another key"
    );
    let shared = keypair.shared_key(&client.mxe()?.public_key);
    let clear = cipher
        .decrypt(
            &shared,
            u128::from_le_bytes(revealed.nonce),
            &[revealed.attack, revealed.health, revealed.defense],
        )
        .context("stat decryption failed")?;

    let stats = StatAllocation::new(clear[0], clear[1], clear[2]);
    info!("Attack : {}", stats.attack);
    info!("Health : {}", stats.health);
    info!("Defense: {}", stats.defense);
    Ok(stats)
}

pub fn decrypt_score<T, C, R>(
    client: &ClashClient<T>,
    cipher: &C,
    rng: &mut R,
    wallet: &Wallet,
    token_id: u64,
    window: DecryptWindow,
) -> Result<u32>
where
    T: Transport,
    C: Cipher,
    R: RngCore + CryptoRng,
{
    let handle = client.encrypted_score(token_id)?;
    debug!(score = %short_handle(&handle_hex(&handle)), "score handle");

    let (keypair, request) = reveal_request(rng, window);
    let offset: u64 = rng.gen();
    let receipt = client
        .queue_reveal_score(wallet, offset, token_id, &request)
        .context("score decryption failed")?;
    info!("Wait for tx:{}...", receipt.signature);

    let revealed = client
        .settle_reveal_score(offset)
        .context("score decryption failed")?;
    ensure!(
        revealed.encryption_key == keypair.public_key(),
        "score was revealed to another key"
    );
    let shared = keypair.shared_key(&client.mxe()?.public_key);
    let score = cipher
        .decrypt(&shared, u128::from_le_bytes(revealed.nonce), &[revealed.score])
        .context("score decryption failed")?[0];
    info!("Score: {}", score);
    Ok(score)
}
