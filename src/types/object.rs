use serde::{Deserialize, Serialize};

use super::{Address, Digest, ObjectId, SequenceNumber, str_u64};

/// Reference to an object at a specific version.
///
/// Becomes stale once a transaction consumes or mutates the object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: Digest,
}

impl ObjectRef {
    pub fn new(object_id: ObjectId, version: SequenceNumber, digest: Digest) -> Self {
        Self {
            object_id,
            version,
            digest,
        }
    }
}

/// Ownership of an object as reported by the fullnode.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub enum Owner {
    AddressOwner(Address),
    ObjectOwner(Address),
    Shared {
        #[serde(deserialize_with = "str_u64::deserialize")]
        initial_shared_version: SequenceNumber,
    },
    Immutable,
    ConsensusAddressOwner {
        #[serde(deserialize_with = "str_u64::deserialize")]
        start_version: SequenceNumber,
        owner: Address,
    },
}

/// Object metadata returned by `sui_getObject`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub object_id: ObjectId,
    #[serde(deserialize_with = "str_u64::deserialize")]
    pub version: SequenceNumber,
    pub digest: Digest,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl ObjectInfo {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id, self.version, self.digest)
    }
}

/// Coin object returned by `suix_getCoins`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    #[serde(deserialize_with = "str_u64::deserialize")]
    pub version: SequenceNumber,
    pub digest: Digest,
    #[serde(deserialize_with = "str_u64::deserialize")]
    pub balance: u64,
}

impl Coin {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.coin_object_id, self.version, self.digest)
    }
}

/// Cursor-paginated RPC response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}
