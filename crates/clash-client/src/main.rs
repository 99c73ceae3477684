use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clash_client::display::short_message;
use clash_client::local::dev_wallet;
use clash_client::tasks::{self, DEFAULT_DECRYPT_DAYS};
use clash_client::{ClashClient, KeystreamCipher, LocalCluster, Pubkey, StatAllocation};
use clash_rules::{clamp_stat, STAT_BUDGET};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "cryptic-clash", about = "Mint encrypted soldiers and send them against monsters")]
struct Cli {
    /// Program id to talk to instead of the built-in one.
    #[arg(long, global = true)]
    address: Option<String>,

    /// Local cluster state file.
    #[arg(long, global = true, default_value = ".cryptic-clash/local.bin")]
    state: PathBuf,

    /// Index of the local wallet that signs.
    #[arg(long, global = true, default_value_t = 1)]
    signer: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the CrypticClash program address.
    Address,
    /// Mint a soldier with 100 points split across the three stats.
    MintSoldier {
        #[arg(long, allow_negative_numbers = true)]
        attack: i64,
        #[arg(long, allow_negative_numbers = true)]
        health: i64,
        #[arg(long, allow_negative_numbers = true)]
        defense: i64,
    },
    /// Attack a monster with the signer's soldier.
    Attack {
        #[arg(long)]
        token_id: u64,
    },
    /// Decrypt the soldier's attack, health and defense.
    DecryptStats {
        #[arg(long)]
        token_id: u64,
        #[arg(long, default_value_t = DEFAULT_DECRYPT_DAYS)]
        days: u32,
    },
    /// Decrypt the soldier's score.
    DecryptScore {
        #[arg(long)]
        token_id: u64,
        #[arg(long, default_value_t = DEFAULT_DECRYPT_DAYS)]
        days: u32,
    },
}

impl Command {
    fn failure_message(&self) -> &'static str {
        match self {
            Command::Address => "Could not resolve the program address.",
            Command::MintSoldier { .. } => "Minting failed.",
            Command::Attack { .. } => "Attack failed.",
            Command::DecryptStats { .. } => "Stat decryption failed.",
            Command::DecryptScore { .. } => "Score decryption failed.",
        }
    }
}

/// Clamp raw inputs into stats and refuse anything but a full budget.
fn allocation(attack: i64, health: i64, defense: i64) -> Result<StatAllocation> {
    let alloc = StatAllocation::new(clamp_stat(attack), clamp_stat(health), clamp_stat(defense));
    if alloc.values().map(i64::from) != [attack, health, defense] {
        warn!(
            attack = alloc.attack,
            health = alloc.health,
            defense = alloc.defense,
            "stats clamped to 0..=100"
        );
    }
    info!(
        "Allocated {}% of {} points",
        alloc.allocation_percent(),
        STAT_BUDGET
    );
    match alloc.remaining() {
        0 => Ok(alloc),
        left if left > 0 => bail!("{} points left to allocate", left),
        over => bail!("{} points over budget", -over),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn run(cli: Cli) -> Result<()> {
    let program_id = match &cli.address {
        Some(address) => Pubkey::from_str(address)
            .with_context(|| format!("invalid program address {}", address))?,
        None => cryptic_clash::ID,
    };

    if let Command::Address = cli.command {
        tasks::address(&ClashClient::with_program_id(
            LocalCluster::new(program_id, 0, unix_now()),
            program_id,
        ));
        return Ok(());
    }

    let cluster = LocalCluster::open(&cli.state, program_id, unix_now())?;
    let client = ClashClient::with_program_id(cluster, program_id);
    let wallet = dev_wallet(cli.signer);
    let mut rng = rand::thread_rng();

    let result = tasks::deploy(&client, &dev_wallet(0)).and_then(|()| match cli.command {
        Command::Address => Ok(()),
        Command::MintSoldier {
            attack,
            health,
            defense,
        } => {
            let alloc = allocation(attack, health, defense)?;
            tasks::mint_soldier(&client, &KeystreamCipher, &mut rng, &wallet, alloc).map(|_| ())
        }
        Command::Attack { token_id } => {
            tasks::attack(&client, &mut rng, &wallet, token_id).map(|_| ())
        }
        Command::DecryptStats { token_id, days } => {
            let window = tasks::window_from_now(&client, days)?;
            tasks::decrypt_stats(&client, &KeystreamCipher, &mut rng, &wallet, token_id, window)
                .map(|_| ())
        }
        Command::DecryptScore { token_id, days } => {
            let window = tasks::window_from_now(&client, days)?;
            tasks::decrypt_score(&client, &KeystreamCipher, &mut rng, &wallet, token_id, window)
                .map(|_| ())
        }
    });

    client.transport().save(&cli.state)?;
    result
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let fallback = cli.command.failure_message();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            println!("{}", short_message(&err, fallback));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_budget_is_accepted() {
        assert_eq!(allocation(40, 30, 30).unwrap(), StatAllocation::new(40, 30, 30));
    }

    #[test]
    fn remaining_points_are_reported() {
        let err = allocation(20, 20, 20).unwrap_err();
        assert_eq!(err.to_string(), "40 points left to allocate");
        let err = allocation(60, 60, 0).unwrap_err();
        assert_eq!(err.to_string(), "20 points over budget");
    }

    #[test]
    fn out_of_range_inputs_are_clamped_first() {
        assert_eq!(allocation(-5, 150, 0).unwrap(), StatAllocation::new(0, 100, 0));
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from([
            "cryptic-clash",
            "--signer",
            "2",
            "mint-soldier",
            "--attack",
            "40",
            "--health",
            "30",
            "--defense",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.signer, 2);
        assert!(matches!(
            cli.command,
            Command::MintSoldier {
                attack: 40,
                health: 30,
                defense: 30
            }
        ));

        let cli = Cli::try_parse_from(["cryptic-clash", "decrypt-score", "--token-id", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::DecryptScore {
                token_id: 3,
                days: DEFAULT_DECRYPT_DAYS
            }
        ));
    }
}
