use clash_client::display::error_code;
use clash_client::local::dev_wallet;
use clash_client::program::soldier_address;
use clash_client::tasks::{self, DEFAULT_DECRYPT_DAYS};
use clash_client::{
    ClashClient, DecryptWindow, KeystreamCipher, LocalCluster, Pubkey, StatAllocation, Transport,
    Wallet,
};
use clash_rules::{health_bonus, SECONDS_PER_DAY};
use cryptic_clash::constant::NO_TOKEN;
use cryptic_clash::error::ErrorCode;
use cryptic_clash::ID;
use rand::rngs::StdRng;
use rand::SeedableRng;

const NOW: i64 = 1_700_000_000;

struct Fixture {
    client: ClashClient<LocalCluster>,
    rng: StdRng,
    alice: Wallet,
    bob: Wallet,
}

impl Fixture {
    fn mint(&mut self, wallet_is_alice: bool, stats: StatAllocation) -> anyhow::Result<u64> {
        let wallet = if wallet_is_alice { &self.alice } else { &self.bob };
        tasks::mint_soldier(&self.client, &KeystreamCipher, &mut self.rng, wallet, stats)
    }

    fn attack(&mut self, wallet_is_alice: bool, token_id: u64) -> anyhow::Result<u32> {
        let wallet = if wallet_is_alice { &self.alice } else { &self.bob };
        tasks::attack(&self.client, &mut self.rng, wallet, token_id).map(|e| e.attacks)
    }

    fn score(&mut self, wallet_is_alice: bool, token_id: u64) -> anyhow::Result<u32> {
        self.score_in(wallet_is_alice, token_id, window())
    }

    fn score_in(
        &mut self,
        wallet_is_alice: bool,
        token_id: u64,
        window: DecryptWindow,
    ) -> anyhow::Result<u32> {
        let wallet = if wallet_is_alice { &self.alice } else { &self.bob };
        tasks::decrypt_score(&self.client, &KeystreamCipher, &mut self.rng, wallet, token_id, window)
    }

    fn stats(&mut self, wallet_is_alice: bool, token_id: u64) -> anyhow::Result<StatAllocation> {
        let wallet = if wallet_is_alice { &self.alice } else { &self.bob };
        tasks::decrypt_stats(
            &self.client,
            &KeystreamCipher,
            &mut self.rng,
            wallet,
            token_id,
            window(),
        )
    }

    fn cluster(&self) -> &LocalCluster {
        self.client.transport()
    }
}

const ALICE: bool = true;
const BOB: bool = false;

fn deploy_fixture(seed: u64) -> Fixture {
    let client = ClashClient::new(LocalCluster::new(ID, seed, NOW));
    tasks::deploy(&client, &dev_wallet(0)).unwrap();
    Fixture {
        client,
        rng: StdRng::seed_from_u64(seed),
        alice: dev_wallet(1),
        bob: dev_wallet(2),
    }
}

fn window() -> DecryptWindow {
    DecryptWindow::new(NOW, DEFAULT_DECRYPT_DAYS)
}

fn code(err: ErrorCode) -> Option<u32> {
    Some(err.into())
}

#[test]
fn mints_a_soldier_with_encrypted_stats_and_score() {
    let mut f = deploy_fixture(1);
    let stats = StatAllocation::new(40, 30, 30);

    let token_id = f.mint(ALICE, stats).unwrap();
    assert_eq!(token_id, 1);
    assert_eq!(f.client.owned_token(&f.alice.address()).unwrap(), token_id);

    assert_eq!(f.stats(ALICE, token_id).unwrap(), stats);
    assert_eq!(f.score(ALICE, token_id).unwrap(), 0);
}

#[test]
fn every_balanced_triple_decrypts_to_its_input() {
    let mut f = deploy_fixture(2);
    let triples = [(100, 0, 0), (0, 100, 0), (0, 0, 100), (33, 33, 34), (45, 35, 20)];

    for (i, (attack, health, defense)) in triples.into_iter().enumerate() {
        let wallet = dev_wallet(10 + i as u8);
        let stats = StatAllocation::new(attack, health, defense);
        let token_id =
            tasks::mint_soldier(&f.client, &KeystreamCipher, &mut f.rng, &wallet, stats).unwrap();
        let clear = tasks::decrypt_stats(
            &f.client,
            &KeystreamCipher,
            &mut f.rng,
            &wallet,
            token_id,
            window(),
        )
        .unwrap();
        assert_eq!(clear, stats);
    }
}

#[test]
fn attack_monster_increases_encrypted_score() {
    let health = 30;
    let bonus = health_bonus(health);
    let mut seen = Vec::new();

    for seed in 0..16 {
        let mut f = deploy_fixture(seed);
        let token_id = f.mint(ALICE, StatAllocation::new(50, health, 20)).unwrap();

        let before = f.score(ALICE, token_id).unwrap();
        assert_eq!(f.attack(ALICE, token_id).unwrap(), 1);
        let after = f.score(ALICE, token_id).unwrap();

        let delta = after - before;
        assert!([bonus + 5, bonus + 15].contains(&delta), "delta {}", delta);
        seen.push(delta);
    }
    assert!(seen.iter().all(|d| (8..=18).contains(d)));
}

#[test]
fn score_accumulates_and_never_decreases() {
    let mut f = deploy_fixture(3);
    let token_id = f.mint(ALICE, StatAllocation::new(0, 100, 0)).unwrap();

    let mut last = 0;
    for round in 1..=5 {
        assert_eq!(f.attack(ALICE, token_id).unwrap(), round);
        let score = f.score(ALICE, token_id).unwrap();
        assert!(score >= last + 15 && score <= last + 25);
        last = score;
    }
}

#[test]
fn attack_refreshes_the_stored_handles() {
    let mut f = deploy_fixture(4);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();
    let before = f.client.encrypted_score(token_id).unwrap();

    f.attack(ALICE, token_id).unwrap();
    let after = f.client.encrypted_score(token_id).unwrap();
    assert_ne!(after.nonce, before.nonce);
    assert_ne!(after.ciphertext, before.ciphertext);

    let stats = f.client.soldier_stats(token_id).unwrap();
    assert_eq!(stats.attack.nonce, after.nonce);
}

#[test]
fn second_mint_by_same_wallet_is_rejected() {
    let mut f = deploy_fixture(5);
    let first = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();

    let err = f.mint(ALICE, StatAllocation::new(30, 30, 40)).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::AlreadyOwnsSoldier));
    assert_eq!(f.client.owned_token(&f.alice.address()).unwrap(), first);

    let second = f.mint(BOB, StatAllocation::new(30, 30, 40)).unwrap();
    assert_eq!(second, first + 1);
}

#[test]
fn owned_token_is_zero_without_a_soldier() {
    let f = deploy_fixture(6);
    assert_eq!(f.client.owned_token(&f.alice.address()).unwrap(), NO_TOKEN);
    assert_eq!(f.client.owned_token(&f.bob.address()).unwrap(), NO_TOKEN);
}

#[test]
fn unbalanced_allocation_never_reaches_the_chain() {
    let mut f = deploy_fixture(7);
    let err = f.mint(ALICE, StatAllocation::new(50, 30, 30)).unwrap_err();
    assert_eq!(err.to_string(), "allocate exactly 100 points, got 110");
    assert_eq!(f.client.arena().unwrap().unwrap().soldiers_minted, 0);
    assert_eq!(f.cluster().pending_computations(), 0);
}

#[test]
fn only_the_owner_can_attack() {
    let mut f = deploy_fixture(8);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();

    let err = f.attack(BOB, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::NotSoldierOwner));
    assert_eq!(f.score(ALICE, token_id).unwrap(), 0);
}

#[test]
fn other_wallets_cannot_decrypt_a_soldier() {
    let mut f = deploy_fixture(9);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();

    let err = f.stats(BOB, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::NotSoldierOwner));

    let err = f.score(BOB, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::NotSoldierOwner));
}

#[test]
fn expired_or_future_windows_are_refused() {
    let mut f = deploy_fixture(10);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();

    let stale = DecryptWindow::new(NOW - 8 * SECONDS_PER_DAY, DEFAULT_DECRYPT_DAYS);
    let err = f.score_in(ALICE, token_id, stale).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::DecryptWindowExpired));

    let future = DecryptWindow::new(NOW + 60, DEFAULT_DECRYPT_DAYS);
    let err = f.score_in(ALICE, token_id, future).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::DecryptWindowNotStarted));

    let endless = DecryptWindow::new(NOW, 0);
    let err = f.score_in(ALICE, token_id, endless).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::InvalidDecryptDuration));

    f.cluster().advance(120);
    assert_eq!(f.score_in(ALICE, token_id, future).unwrap(), 0);
}

#[test]
fn reveal_waits_for_pending_attack() {
    let mut f = deploy_fixture(11);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();

    f.client.queue_attack(&f.alice, 77, token_id).unwrap();
    let err = f.score(ALICE, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::SoldierBusy));
    let err = f.stats(ALICE, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::SoldierBusy));

    f.client.settle_attack(77).unwrap();
    let score = f.score(ALICE, token_id).unwrap();
    assert!([8, 18].contains(&score), "score {}", score);
}

#[test]
fn aborted_mint_frees_the_wallet() {
    let mut f = deploy_fixture(12);
    f.cluster().fail_next_computation();

    let err = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::AbortedComputation));
    assert_eq!(f.client.owned_token(&f.alice.address()).unwrap(), NO_TOKEN);

    let err = f.client.soldier_stats(1).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::SoldierNotReady));
    let err = f.attack(ALICE, 1).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::SoldierNotReady));

    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();
    assert_eq!(token_id, 2);
    assert_eq!(f.client.owned_token(&f.alice.address()).unwrap(), 2);
}

#[test]
fn aborted_attack_keeps_the_score() {
    let mut f = deploy_fixture(13);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();
    f.attack(ALICE, token_id).unwrap();
    let score = f.score(ALICE, token_id).unwrap();

    f.cluster().fail_next_computation();
    let err = f.attack(ALICE, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::AbortedComputation));
    assert_eq!(f.score(ALICE, token_id).unwrap(), score);

    assert_eq!(f.attack(ALICE, token_id).unwrap(), 2);
}

#[test]
fn aborted_reveal_is_an_error() {
    let mut f = deploy_fixture(14);
    let token_id = f.mint(ALICE, StatAllocation::new(40, 30, 30)).unwrap();

    f.cluster().fail_next_computation();
    let err = f.score(ALICE, token_id).unwrap_err();
    assert_eq!(error_code(&err), code(ErrorCode::AbortedComputation));
    assert_eq!(f.score(ALICE, token_id).unwrap(), 0);
}

#[test]
fn program_address_can_be_overridden() {
    let custom = Pubkey::new_from_array([0xc1; 32]);
    let client = ClashClient::with_program_id(LocalCluster::new(custom, 15, NOW), custom);
    assert_eq!(tasks::address(&client), custom);

    tasks::deploy(&client, &dev_wallet(0)).unwrap();
    let mut rng = StdRng::seed_from_u64(15);
    let token_id = tasks::mint_soldier(
        &client,
        &KeystreamCipher,
        &mut rng,
        &dev_wallet(1),
        StatAllocation::new(40, 30, 30),
    )
    .unwrap();
    let soldier = soldier_address(&custom, token_id);
    assert!(client.transport().account_data(&soldier).unwrap().is_some());
    assert!(client
        .transport()
        .account_data(&soldier_address(&ID, token_id))
        .unwrap()
        .is_none());

    // the built-in program id is not deployed on this cluster
    let stock = ClashClient::new(LocalCluster::new(custom, 16, NOW));
    let err = tasks::deploy(&stock, &dev_wallet(0)).unwrap_err();
    assert!(err.root_cause().to_string().contains("not deployed"));
}
