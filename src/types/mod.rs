mod address;
mod digest;
mod effects;
mod object;
mod transaction;
mod type_tag;

pub use address::{Address, ObjectId};
pub use digest::Digest;
pub use effects::{DryRunResult, ExecutionResult, ExecutionStatus, GasCostSummary, TransactionEffects};
pub use object::{Coin, ObjectInfo, ObjectRef, Owner, Page};
pub use transaction::{
    Argument, CallArg, Command, GasData, ObjectArg, ProgrammableMoveCall,
    ProgrammableTransaction, TransactionData, TransactionDataV1, TransactionExpiration,
    TransactionKind,
};
pub use type_tag::{StructTag, TypeTag};

/// Version of an on-chain object.
pub type SequenceNumber = u64;

/// Epoch number.
pub type EpochId = u64;

/// Fully qualified type of the native SUI coin.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Fullnode JSON encodes 64-bit integers as decimal strings in most
/// responses, and as plain numbers in a few.
pub(crate) mod str_u64 {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StrOrNum::deserialize(deserializer)? {
            StrOrNum::Str(s) => s.parse().map_err(D::Error::custom),
            StrOrNum::Num(n) => Ok(n),
        }
    }
}
