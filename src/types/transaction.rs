//! BCS model of a programmable transaction.
//!
//! Layouts and variant order mirror the on-chain `TransactionData`, so
//! [`TransactionData::to_bytes`] produces the exact payload the fullnode and
//! the offline signers expect.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use super::{Address, EpochId, ObjectId, ObjectRef, SequenceNumber, TypeTag};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: Address,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: Address,
    pub price: u64,
    pub budget: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionExpiration {
    #[default]
    None,
    Epoch(EpochId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// BCS-encoded pure value.
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: ObjectId,
        initial_shared_version: SequenceNumber,
        mutable: bool,
    },
    Receiving(ObjectRef),
}

impl ObjectArg {
    pub fn id(&self) -> ObjectId {
        match self {
            ObjectArg::ImmOrOwnedObject(r) | ObjectArg::Receiving(r) => r.object_id,
            ObjectArg::SharedObject { id, .. } => *id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
    MergeCoins(Argument, Vec<Argument>),
    Publish(Vec<Vec<u8>>, Vec<ObjectId>),
    MakeMoveVec(Option<TypeTag>, Vec<Argument>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin of the transaction.
    GasCoin,
    Input(u16),
    /// Result of a command that returns a single value.
    Result(u16),
    NestedResult(u16, u16),
}

impl TransactionData {
    pub fn new(
        kind: TransactionKind,
        sender: Address,
        gas_data: GasData,
        expiration: TransactionExpiration,
    ) -> Self {
        Self::V1(TransactionDataV1 {
            kind,
            sender,
            gas_data,
            expiration,
        })
    }

    pub fn sender(&self) -> Address {
        match self {
            Self::V1(v1) => v1.sender,
        }
    }

    pub fn gas_data(&self) -> &GasData {
        match self {
            Self::V1(v1) => &v1.gas_data,
        }
    }

    pub fn expiration(&self) -> TransactionExpiration {
        match self {
            Self::V1(v1) => v1.expiration,
        }
    }

    pub fn programmable(&self) -> &ProgrammableTransaction {
        match self {
            Self::V1(TransactionDataV1 {
                kind: TransactionKind::ProgrammableTransaction(pt),
                ..
            }) => pt,
        }
    }

    /// Objects the transaction consumes as owned inputs, gas payment included.
    pub fn owned_object_refs(&self) -> Vec<ObjectRef> {
        self.programmable()
            .inputs
            .iter()
            .filter_map(|input| match input {
                CallArg::Object(ObjectArg::ImmOrOwnedObject(r)) => Some(*r),
                _ => None,
            })
            .chain(self.gas_data().payment.iter().copied())
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bytes)?)
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.to_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        Self::from_bytes(&BASE64.decode(encoded.trim())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Digest;

    fn sample() -> TransactionData {
        let coin = ObjectRef::new("0xc0".parse().unwrap(), 7, Digest::new([1; 32]));
        let gas = ObjectRef::new("0x9a5".parse().unwrap(), 3, Digest::new([2; 32]));
        TransactionData::new(
            TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
                inputs: vec![
                    CallArg::Object(ObjectArg::ImmOrOwnedObject(coin)),
                    CallArg::Pure(bcs::to_bytes(&5u64).unwrap()),
                ],
                commands: vec![Command::SplitCoins(
                    Argument::Input(0),
                    vec![Argument::Input(1)],
                )],
            }),
            "0xa11ce".parse().unwrap(),
            GasData {
                payment: vec![gas],
                owner: "0xa11ce".parse().unwrap(),
                price: 1000,
                budget: 10_000_000,
            },
            TransactionExpiration::Epoch(12),
        )
    }

    #[test]
    fn test_bcs_header_bytes() {
        let bytes = sample().to_bytes().unwrap();
        // TransactionData::V1, TransactionKind::ProgrammableTransaction,
        // two inputs, first one CallArg::Object(ImmOrOwnedObject)
        assert_eq!(&bytes[..5], &[0, 0, 2, 1, 0]);
        // expiration is the trailing Epoch(12)
        let tail = &bytes[bytes.len() - 9..];
        assert_eq!(tail[0], 1);
        assert_eq!(&tail[1..], &12u64.to_le_bytes());
    }

    #[test]
    fn test_base64_decodes_back() {
        let tx = sample();
        let decoded = TransactionData::from_base64(&tx.to_base64().unwrap()).unwrap();
        assert_eq!(decoded.sender(), tx.sender());
        assert_eq!(decoded.expiration(), TransactionExpiration::Epoch(12));
        assert_eq!(decoded.owned_object_refs().len(), 2);
    }
}
