//! Staking Ledger operator tool
//!
//! Creates a genesis ledger, replays operation journals against the stored
//! snapshot and prints ledger state.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use staking_core::{parse_journal, replay, Address, Amount, StakingLedger};
use staking_storage::Storage;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "staking-ledger")]
#[command(about = "Staking token ledger operator tool", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Snapshot directory (overrides config)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Snapshot name (overrides config)
    #[arg(short, long)]
    snapshot: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the genesis ledger and save it
    Init {
        /// Owner address (overrides config)
        #[arg(long)]
        owner: Option<Address>,

        /// Initial supply credited to the owner (overrides config)
        #[arg(long)]
        supply: Option<Amount>,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Apply a JSON journal of operations to the stored ledger
    Replay {
        /// Journal file: JSON array of {caller, operation}
        journal: PathBuf,
    },

    /// Show ledger totals, or one account
    Show {
        /// Account to inspect
        #[arg(short, long)]
        account: Option<Address>,
    },

    /// Check all ledger invariants on the stored snapshot
    Verify,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, missing_config) = Config::load_or_default(cli.config.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if let Some(path) = missing_config {
        log::warn!("config {} not found, using defaults", path.display());
    }

    let data_dir = cli.data_dir.unwrap_or(config.storage.data_dir.clone());
    let snapshot = cli
        .snapshot
        .unwrap_or_else(|| config.storage.snapshot_name.clone());
    let storage = Storage::open(&data_dir)
        .with_context(|| format!("opening data dir {}", data_dir.display()))?;

    match cli.command {
        Commands::Init {
            owner,
            supply,
            force,
        } => {
            let owner = owner
                .or(config.genesis.owner)
                .context("no owner given (use --owner or [genesis] owner)")?;
            let supply = supply.or(config.genesis.initial_supply).unwrap_or(0);

            if storage.has_snapshot(&snapshot) && !force {
                bail!(
                    "snapshot '{}' already exists in {} (use --force to overwrite)",
                    snapshot,
                    data_dir.display()
                );
            }

            let ledger = StakingLedger::new(owner, supply);
            storage.save_ledger(&snapshot, &ledger)?;

            println!("\n{}", "🌱 Genesis ledger created".green().bold());
            println!("═══════════════════════════════════");
            println!("Owner:          {}", owner);
            println!("Initial Supply: {}", supply);
            println!("Snapshot:       {}/{}", data_dir.display(), snapshot);
            println!();
        }

        Commands::Replay { journal } => {
            let mut ledger = storage.load_ledger(&snapshot)?;
            let contents = std::fs::read_to_string(&journal)
                .with_context(|| format!("reading journal {}", journal.display()))?;
            let entries = parse_journal(&contents)
                .with_context(|| format!("parsing journal {}", journal.display()))?;

            let outcomes = replay(&mut ledger, &entries);

            println!("\n{}", "📜 Journal Replay".cyan().bold());
            println!("═══════════════════════════════════");
            let mut rejected = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(receipt) => {
                        println!(
                            "  {} #{} {:?} by {}",
                            "✓".green(),
                            outcome.index,
                            outcome.entry.operation,
                            outcome.entry.caller
                        );
                        for event in &receipt.events {
                            println!("      {}", event.bright_black());
                        }
                    }
                    Err(e) => {
                        rejected += 1;
                        println!(
                            "  {} #{} {:?} by {}: {}",
                            "✗".red(),
                            outcome.index,
                            outcome.entry.operation,
                            outcome.entry.caller,
                            e.red()
                        );
                    }
                }
            }
            println!(
                "\nApplied {} of {} entries",
                outcomes.len() - rejected,
                outcomes.len()
            );

            storage.save_ledger(&snapshot, &ledger)?;
            print_totals(&ledger);
        }

        Commands::Show { account } => {
            let ledger = storage.load_ledger(&snapshot)?;
            match account {
                Some(account) => print_account(&ledger, &account),
                None => print_totals(&ledger),
            }
        }

        Commands::Verify => {
            let ledger: StakingLedger = storage.load_snapshot(&snapshot)?;
            match ledger.check_invariants() {
                Ok(()) => println!("{} ledger '{}' is consistent", "✓".green(), snapshot),
                Err(violation) => bail!("ledger '{}' is inconsistent: {}", snapshot, violation),
            }
        }
    }

    Ok(())
}

fn print_totals(ledger: &StakingLedger) {
    println!("\n{}", "📊 Ledger Totals".cyan().bold());
    println!("═══════════════════════════════════");
    println!("Owner:         {}", ledger.owner());
    println!("Total Supply:  {}", ledger.total_supply());
    println!("Total Stakes:  {}", ledger.total_stakes());
    println!("Total Rewards: {}", ledger.total_rewards());
    println!("Accounts:      {}", ledger.accounts().len());

    println!("\nStakeholders ({})", ledger.stakeholders().len());
    for (i, holder) in ledger.stakeholders().iter().enumerate() {
        println!(
            "  {}. {}  stake {}  reward {}",
            i + 1,
            holder,
            ledger.stake_of(holder).to_string().green(),
            ledger.reward_of(holder)
        );
    }
    println!();
}

fn print_account(ledger: &StakingLedger, account: &Address) {
    let (present, index) = ledger.is_stakeholder(account);

    println!("\n{}", "💰 Account".cyan().bold());
    println!("═══════════════════════════════════");
    println!("Address:      {}", account);
    println!("Balance:      {}", ledger.balance_of(account));
    println!("Stake:        {}", ledger.stake_of(account));
    println!("Reward:       {}", ledger.reward_of(account));
    println!("Next Reward:  {}", ledger.calculate_reward(account));
    if present {
        println!("Stakeholder:  yes (position {})", index);
    } else {
        println!("Stakeholder:  no");
    }
    println!();
}
