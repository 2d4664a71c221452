//! Error types for the operations binary.

use crate::config::ConfigError;

/// Main error type for the operations binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("DeepBook ops error: {0}")]
    Ops(#[from] deepbook_ops::Error),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),

    #[error("{failed} of {total} benchmark transactions failed")]
    BenchFailures { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
