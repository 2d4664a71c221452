//! DeepBook operational toolkit.
//!
//! # Overview
//!
//! Thin client layer over the Sui JSON-RPC API used to operate a DeepBook
//! deployment: resolve a signer, build programmable transactions, consolidate
//! coins, and prepare unsigned transactions for offline multisig signing.
//!
//! Use [`signer::get_signer`] to obtain a [`crypto::Keypair`] from the
//! environment or the local keystore, [`rpc::client`] to connect to one of
//! the [`Network`]s, and [`builder::TransactionBuilder`] to assemble
//! transactions. [`multisig::prepare_multisig_tx`] dry-runs an admin
//! transaction and persists its bytes for the multisig signers;
//! [`coin::merge_all_coins`] collapses fragmented coin objects.
//!
//! Every operation talks to the chain through the [`rpc::SuiApi`] trait, so
//! the same code runs against [`rpc::RpcClient`] and the in-memory
//! [`testing::MockLedger`].
//!
//! # Limitations/follow-ups
//!
//! * Budget estimation relies on a single dry run; there is no
//!   protocol-config lookup for the maximum budget.
//!
//! * Coin consolidation does not guard against a ledger that keeps reporting
//!   success without changing the coin set (see [`coin::merge_all_coins`]).

pub mod bench;
pub mod builder;
pub mod coin;
pub mod crypto;
pub mod deepbook;
pub mod error;
pub mod execute;
pub mod localnet;
pub mod multisig;
pub mod num;
pub mod retry;
pub mod rpc;
pub mod signer;
pub mod testing;
pub mod types;

use std::{fmt, str::FromStr};

pub use error::{Error, Result};

/// Sui environment the tooling is operating on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Mainnet,
        Network::Testnet,
        Network::Devnet,
        Network::Localnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }

    /// Public fullnode endpoint of the network.
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Localnet => "http://127.0.0.1:9000",
        }
    }

    /// Move registry (name resolution) endpoint, only served for
    /// mainnet and testnet.
    pub fn mvr_url(&self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("https://mainnet.mvr.mystenlabs.com"),
            Network::Testnet => Some("https://testnet.mvr.mystenlabs.com"),
            Network::Devnet | Network::Localnet => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Network::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown network: {s}")))
    }
}
