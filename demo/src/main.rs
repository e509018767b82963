//! Delegated Authorization Demo CLI
//!
//! Runs scripted delegation scenarios against an in-memory app with a bank
//! module and the authorization module.
//!
//! Usage:
//!   cargo run -p authz-demo -- spend-limit
//!   cargo run -p authz-demo -- expiry
//!   cargo run -p authz-demo -- run path/to/scenario.toml

mod script;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use authz_types::AuthzResult;

use script::Script;

const SPEND_LIMIT: &str = include_str!("../scenarios/spend_limit.toml");
const EXPIRY: &str = include_str!("../scenarios/expiry.toml");

// ── CLI definition ────────────────────────────────────────────────────────────

/// Delegated message authorization demo.
#[derive(Parser)]
#[command(
    name = "authz-demo",
    about = "Delegated message authorization demo",
    long_about = "Runs delegation scenarios: a granter lets a grantee act on its behalf,\n\
                  within a spend limit or until an expiration."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// A spend-limited grant narrowing with each send until it is used up.
    SpendLimit,
    /// An unrestricted grant that lapses at its expiration.
    Expiry,
    /// Run a scenario from a TOML file.
    Run {
        /// Path to the scenario file.
        file: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-step engine output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let script = match cli.command {
        Command::SpendLimit => Script::from_toml_str(SPEND_LIMIT),
        Command::Expiry => Script::from_toml_str(EXPIRY),
        Command::Run { file } => Script::from_file(&file),
    };

    match script.and_then(|s| run(&s)) {
        Ok(()) => println!("Scenario completed successfully."),
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(script: &Script) -> AuthzResult<()> {
    println!();
    println!("Scenario: {}", script.name);
    println!("{}", "=".repeat(10 + script.name.len()));
    println!();

    let outcome = script.run()?;

    println!();
    println!("  Steps run:   {}", outcome.steps);
    for (name, coins) in &outcome.balances {
        println!("  {:<12} {}", name, coins);
    }
    println!("  State hash:  {}", outcome.state_hash);
    println!();
    Ok(())
}
