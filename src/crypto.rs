//! Keypairs, key encodings and transaction signatures.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bech32::{Bech32, Hrp};
use blake2::{Blake2b, Digest, digest::consts::U32};
use ed25519_dalek::Signer as _;

use crate::{
    error::{Error, Result},
    types::Address,
};

/// Human-readable part of Bech32 encoded private keys.
pub const SUI_PRIVATE_KEY_PREFIX: &str = "suiprivkey";

/// Intent prefix of a transaction message: scope, version, app id.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

const SECRET_KEY_LENGTH: usize = 32;

pub(crate) fn blake2b256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    Ed25519,
    Secp256k1,
    Secp256r1,
}

impl SignatureScheme {
    pub fn flag(&self) -> u8 {
        match self {
            SignatureScheme::Ed25519 => 0x00,
            SignatureScheme::Secp256k1 => 0x01,
            SignatureScheme::Secp256r1 => 0x02,
        }
    }

    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0x00 => Ok(SignatureScheme::Ed25519),
            0x01 => Ok(SignatureScheme::Secp256k1),
            0x02 => Ok(SignatureScheme::Secp256r1),
            other => Err(Error::UnsupportedScheme(other)),
        }
    }
}

#[derive(Clone)]
enum SecretKey {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    Secp256r1(p256::ecdsa::SigningKey),
}

/// Signing keypair together with its derived Sui address.
#[derive(Clone, derive_more::Debug)]
pub struct Keypair {
    scheme: SignatureScheme,
    #[debug(skip)]
    secret: SecretKey,
    #[debug("{address}")]
    address: Address,
}

impl Keypair {
    pub fn ed25519(secret: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_signing_key(
            SignatureScheme::Ed25519,
            SecretKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&secret)),
        )
    }

    fn from_signing_key(scheme: SignatureScheme, secret: SecretKey) -> Self {
        let public_key = public_key_bytes(&secret);
        let address = Address::new(blake2b256(&[&[scheme.flag()], &public_key]));
        Self {
            scheme,
            secret,
            address,
        }
    }

    pub fn from_secret(scheme: SignatureScheme, secret: &[u8]) -> Result<Self> {
        let invalid = |e: String| Error::InvalidKey(format!("{scheme:?}: {e}"));
        let secret = match scheme {
            SignatureScheme::Ed25519 => {
                let bytes = <[u8; SECRET_KEY_LENGTH]>::try_from(secret)
                    .map_err(|_| invalid(format!("expected 32 bytes, got {}", secret.len())))?;
                return Ok(Self::ed25519(bytes));
            }
            SignatureScheme::Secp256k1 => SecretKey::Secp256k1(
                k256::ecdsa::SigningKey::from_slice(secret).map_err(|e| invalid(e.to_string()))?,
            ),
            SignatureScheme::Secp256r1 => SecretKey::Secp256r1(
                p256::ecdsa::SigningKey::from_slice(secret).map_err(|e| invalid(e.to_string()))?,
            ),
        };
        Ok(Self::from_signing_key(scheme, secret))
    }

    /// Decodes a `suiprivkey1...` Bech32 string.
    pub fn from_private_key(encoded: &str) -> Result<Self> {
        let (hrp, data) =
            bech32::decode(encoded.trim()).map_err(|e| Error::InvalidKey(e.to_string()))?;
        if hrp.as_str() != SUI_PRIVATE_KEY_PREFIX {
            return Err(Error::InvalidKey(format!("unexpected key prefix: {hrp}")));
        }
        Self::from_flagged_bytes(&data)
    }

    /// Decodes one entry of the `sui.keystore` file, base64 of
    /// `flag || secret`.
    pub fn from_keystore_entry(entry: &str) -> Result<Self> {
        let data = BASE64
            .decode(entry.trim())
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Self::from_flagged_bytes(&data)
    }

    fn from_flagged_bytes(data: &[u8]) -> Result<Self> {
        let (flag, secret) = data
            .split_first()
            .ok_or_else(|| Error::InvalidKey("empty key".to_string()))?;
        Self::from_secret(SignatureScheme::from_flag(*flag)?, secret)
    }

    pub fn to_private_key(&self) -> Result<String> {
        let hrp = Hrp::parse(SUI_PRIVATE_KEY_PREFIX).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let mut data = vec![self.scheme.flag()];
        data.extend_from_slice(&self.secret_bytes());
        bech32::encode::<Bech32>(hrp, &data).map_err(|e| Error::InvalidKey(e.to_string()))
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        public_key_bytes(&self.secret)
    }

    fn secret_bytes(&self) -> Vec<u8> {
        match &self.secret {
            SecretKey::Ed25519(key) => key.to_bytes().to_vec(),
            SecretKey::Secp256k1(key) => key.to_bytes().to_vec(),
            SecretKey::Secp256r1(key) => key.to_bytes().to_vec(),
        }
    }

    /// Signs BCS transaction bytes, returning the base64 serialized
    /// signature `flag || signature || public key` accepted by the fullnode.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = blake2b256(&[&TRANSACTION_INTENT, tx_bytes]);
        let signature: Vec<u8> = match &self.secret {
            SecretKey::Ed25519(key) => key.sign(&digest).to_bytes().to_vec(),
            SecretKey::Secp256k1(key) => {
                let sig: k256::ecdsa::Signature = key.sign(&digest);
                sig.to_bytes().to_vec()
            }
            SecretKey::Secp256r1(key) => {
                let sig: p256::ecdsa::Signature = key.sign(&digest);
                sig.normalize_s().unwrap_or(sig).to_bytes().to_vec()
            }
        };
        let mut serialized = Vec::with_capacity(1 + signature.len() + 33);
        serialized.push(self.scheme.flag());
        serialized.extend_from_slice(&signature);
        serialized.extend_from_slice(&self.public_key_bytes());
        BASE64.encode(serialized)
    }
}

fn public_key_bytes(secret: &SecretKey) -> Vec<u8> {
    match secret {
        SecretKey::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
        SecretKey::Secp256k1(key) => key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec(),
        SecretKey::Secp256r1(key) => key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec(),
    }
}
