//! Configuration for the operations binary.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): endpoints, keys, gas object
//! - CLI arguments: the command and its parameters

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use deepbook_ops::{
    Network,
    multisig::MultisigConfig,
    signer::DEFAULT_SUI_BINARY,
    types::{Address, ObjectId},
};
use url::Url;

const DEFAULT_NETWORK: Network = Network::Testnet;

/// Environment configuration (connection details, credentials).
#[derive(derive_more::Debug, Default, serde::Deserialize)]
pub struct EnvConfig {
    /// Bech32 `suiprivkey` secret; the keystore is used when absent
    #[debug(skip)]
    pub private_key: Option<String>,

    /// Fullnode URL overriding the network default
    pub rpc_url: Option<String>,

    /// Coin paying for multisig transactions
    pub gas_object: Option<String>,

    /// `development` selects the local multisig output file
    pub node_env: Option<String>,

    /// Path of the `sui` CLI used to look up the active address
    pub sui_binary: Option<String>,

    pub network: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn sui_binary(&self) -> &str {
        self.sui_binary.as_deref().unwrap_or(DEFAULT_SUI_BINARY)
    }

    pub fn multisig_config(&self) -> deepbook_ops::Result<MultisigConfig> {
        MultisigConfig::from_values(self.gas_object.as_deref(), self.node_env.as_deref())
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "deepbook-ops")]
#[command(about = "Operational tooling for DeepBook on Sui")]
pub struct Cli {
    /// Network to operate on (mainnet, testnet, devnet, localnet).
    /// Falls back to the NETWORK environment variable, then testnet
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Fullnode URL, overrides RPC_URL
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the address of the resolved signer
    ActiveAddress,

    /// Merge all coins of a type owned by the signer into one
    MergeCoins {
        #[arg(long, default_value = "0x2::sui::SUI")]
        coin_type: String,

        /// Coin paying for the merges; defaults to the first owned SUI coin
        #[arg(long)]
        gas_coin: Option<String>,
    },

    /// Prepare an admin transaction for multisig signing
    Multisig {
        /// Multisig address; defaults to the admin capability owner
        #[arg(long, global = true)]
        sender: Option<String>,

        /// Directory receiving the transaction file
        #[arg(long, global = true)]
        output_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: MultisigAction,
    },

    /// Manage a balance manager owned by the signer
    BalanceManager {
        #[command(subcommand)]
        action: BalanceManagerAction,
    },

    /// Place and cancel orders through a balance manager
    MarketMaker {
        #[command(subcommand)]
        action: MarketMakerAction,
    },

    /// Submit transactions concurrently and report gas usage
    Bench {
        #[arg(long, default_value_t = 10)]
        count: usize,

        #[command(subcommand)]
        workload: BenchWorkload,
    },

    /// Local network helpers
    Localnet {
        #[command(subcommand)]
        action: LocalnetAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum MultisigAction {
    EnableVersion {
        #[arg(long)]
        version: u64,
    },
    DisableVersion {
        #[arg(long)]
        version: u64,
    },
    UnregisterPool {
        #[arg(long)]
        base: String,
        #[arg(long)]
        quote: String,
    },
    UpdateAllowedVersions {
        #[arg(long)]
        pool: String,
        #[arg(long)]
        base: String,
        #[arg(long)]
        quote: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum BalanceManagerAction {
    Create,
    Deposit {
        #[arg(long)]
        manager: String,
        /// Coin symbol, e.g. SUI or DEEP
        #[arg(long)]
        coin: String,
        /// Decimal amount, e.g. 1.5
        #[arg(long)]
        amount: String,
    },
    Withdraw {
        #[arg(long)]
        manager: String,
        #[arg(long)]
        coin: String,
        #[arg(long)]
        amount: String,
        /// Defaults to the signer
        #[arg(long)]
        recipient: Option<String>,
    },
    WithdrawAll {
        #[arg(long)]
        manager: String,
        #[arg(long)]
        coin: String,
        #[arg(long)]
        recipient: Option<String>,
    },
}

/// Pool and balance manager an order command acts on.
#[derive(Debug, Args)]
pub struct PoolArgs {
    #[arg(long)]
    pub pool: String,
    /// Base coin symbol, e.g. SUI
    #[arg(long)]
    pub base: String,
    /// Quote coin symbol, e.g. DBUSDC
    #[arg(long)]
    pub quote: String,
    #[arg(long)]
    pub manager: String,
}

#[derive(Debug, Subcommand)]
pub enum MarketMakerAction {
    /// Cancel open orders and quote a bid/ask ladder around a mid price
    Quote {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        mid: String,
        #[arg(long, default_value_t = 10)]
        levels: u32,
        /// Base quantity of every order
        #[arg(long)]
        quantity: String,
    },
    PlaceOrder {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        price: String,
        #[arg(long)]
        quantity: String,
        /// Sell instead of buy
        #[arg(long)]
        ask: bool,
        #[arg(long, default_value_t = 1)]
        client_order_id: u64,
    },
    CancelAll {
        #[command(flatten)]
        pool: PoolArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum BenchWorkload {
    /// One argument-free Move call per transaction
    Call {
        /// `package::module::function`
        #[arg(long)]
        target: String,
    },
    /// One limit order per transaction, each with its own client order id
    LimitOrder {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        price: String,
        #[arg(long)]
        quantity: String,
        #[arg(long)]
        ask: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum LocalnetAction {
    /// Wait for localnet and its faucet, then fund an address
    Fund {
        /// Defaults to the signer
        #[arg(long)]
        address: Option<String>,
    },
}

impl Cli {
    /// Network from the flag, then the environment, then testnet.
    pub fn network(&self, env: &EnvConfig) -> Result<Network, ConfigError> {
        match self.network.as_deref().or(env.network.as_deref()) {
            Some(name) => name
                .parse()
                .map_err(|_| ConfigError::InvalidNetwork(name.to_string())),
            None => Ok(DEFAULT_NETWORK),
        }
    }

    /// RPC URL from the flag, then the environment.
    pub fn rpc_url(&self, env: &EnvConfig) -> Result<Option<Url>, url::ParseError> {
        self.rpc_url
            .as_deref()
            .or(env.rpc_url.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(Url::parse)
            .transpose()
    }
}

pub fn parse_object_id(field: &'static str, value: &str) -> Result<ObjectId, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidObjectId(field, value.to_string()))
}

pub fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    parse_object_id(field, value)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown network: {0}")]
    InvalidNetwork(String),

    #[error("Invalid {0}: {1}")]
    InvalidObjectId(&'static str, String),

    #[error("Benchmark count must be positive")]
    ZeroCount,
}
