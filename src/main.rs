//! Ledgerweb main entry point

use anyhow::Context;
use clap::Parser;
use ledgerweb_api::start_server;
use ledgerweb_config::Config;
use ledgerweb_core::{JsonFileStore, Ledger};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "ledgerweb")]
#[command(author = "Ledgerweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A small personal finance tracker served over a JSON file", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Data file path (overrides data.path from the config)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config_missing = !args.config.exists();
    let mut config = if config_missing {
        Config::default()
    } else {
        match Config::load(args.config.clone()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e.to_details());
                return Err(e).with_context(|| {
                    format!("failed to load configuration from {}", args.config.display())
                });
            }
        }
    };
    if let Some(data) = args.data {
        config.data.path = data;
        config.validate().context("invalid --data override")?;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if config_missing {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!("Data file: {}", config.data.path.display());

    let store = Arc::new(JsonFileStore::new(config.data.path.clone()).pretty(config.data.pretty));
    let ledger = Arc::new(RwLock::new(Ledger::new(store, config.accounts.default_budget_limit)));

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, ledger))
}
