use std::time::Duration;

use crate::types::{Address, ObjectId};

pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC error codes the fullnode uses for malformed requests.
const INVALID_REQUEST_CODES: [i64; 3] = [-32600, -32601, -32602];

/// Error returned by the toolkit.
///
/// Configuration and lookup errors are fatal for the calling script, there is
/// no retry anywhere in the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported signature scheme flag: {0:#04x}")]
    UnsupportedScheme(u8),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("keypair not found for sender: {0}")]
    KeypairNotFound(Address),

    #[error("failed to resolve active address: {0}")]
    ActiveAddress(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("invalid type tag: {0}")]
    InvalidTypeTag(String),

    #[error("invalid move call target: {0}")]
    InvalidTarget(String),

    #[error("unknown coin: {0}")]
    UnknownCoin(String),

    #[error("amount {0} does not fit into coin base units")]
    InvalidAmount(String),

    #[error("unsupported coin decimals: {0}")]
    InvalidDecimals(u8),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("no gas object supplied for a multisig transaction")]
    MissingGasObject,

    #[error("invalid gas object supplied: {0}")]
    InvalidGasObject(ObjectId),

    #[error("transaction sender is not set")]
    MissingSender,

    #[error("insufficient gas, needed: {needed}, available: {available}")]
    InsufficientGas { needed: u64, available: u64 },

    #[error("transaction too large: {0}")]
    TooLarge(String),

    #[error("dry run failed: {0}")]
    DryRunFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("faucet request failed: {0}")]
    Faucet(String),

    #[error("bcs error: {0}")]
    Bcs(#[from] bcs::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classifies a JSON-RPC error object returned by the fullnode.
    pub(crate) fn from_rpc(code: i64, message: String) -> Self {
        let msg = message.to_ascii_lowercase();
        if INVALID_REQUEST_CODES.contains(&code)
            && (msg.contains("invalid") || msg.contains("deserialize"))
        {
            Self::InvalidRequest(message)
        } else {
            Self::Rpc { code, message }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::InvalidRequest(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(value: base64::DecodeError) -> Self {
        Self::InvalidRequest(value.to_string())
    }
}
