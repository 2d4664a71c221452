//! Operational tooling for DeepBook on Sui.
//!
//! Resolves a signer from the environment or the local keystore, talks to
//! the selected network and runs one command: coin consolidation, multisig
//! transaction preparation, balance manager maintenance, order placement, a
//! submission benchmark or localnet funding.

mod commands;
mod config;
mod error;

use clap::Parser;
use std::process::exit;
use tracing::error;

use commands::Ops;
use config::{Cli, EnvConfig};

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    let cli = Cli::parse();

    let network = match cli.network(&env_config) {
        Ok(network) => network,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    let rpc_url = match cli.rpc_url(&env_config) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid RPC URL: {}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let ops = match Ops::new(network, rpc_url, env_config) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", network, e);
            exit(1);
        }
    };

    if let Err(e) = ops.run(cli.command).await {
        error!(%e, "Command failed");
        exit(1);
    }
}
