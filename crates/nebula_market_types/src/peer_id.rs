use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[cfg(test)]
#[path = "peer_id_tests.rs"]
mod peer_id_tests;

// Multihash header carried by network peer identities: an identity-hashed
// ed25519 public key, base58-encoded together with this fixed prefix.
const MULTIHASH_HEADER: [u8; 6] = [0x00, 0x24, 0x08, 0x01, 0x12, 0x20];
const DECODED_LEN: usize = MULTIHASH_HEADER.len() + B256::len_bytes();

/// A compute peer identity.
///
/// The market contract stores the 32 raw key bytes; the p2p side renders the
/// same identity in base58 with a multihash header. Conversion is lossless in
/// both directions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(B256);

impl PeerId {
    pub const fn new(raw: B256) -> Self {
        Self(raw)
    }

    /// The raw 32-byte form used by the market contract.
    pub const fn as_b256(&self) -> B256 {
        self.0
    }

    pub fn to_base58(self) -> String {
        let mut bytes = Vec::with_capacity(DECODED_LEN);
        bytes.extend_from_slice(&MULTIHASH_HEADER);
        bytes.extend_from_slice(self.0.as_slice());
        bs58::encode(bytes).into_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeerIdParseError {
    #[error("invalid base58 encoding: {0}")]
    Encoding(#[from] bs58::decode::Error),
    #[error("peer id must decode to {DECODED_LEN} bytes, got {0}")]
    Length(usize),
    #[error("peer id carries an unexpected multihash header")]
    Header,
}

impl FromStr for PeerId {
    type Err = PeerIdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(value).into_vec()?;
        if bytes.len() != DECODED_LEN {
            return Err(PeerIdParseError::Length(bytes.len()));
        }
        let (header, raw) = bytes.split_at(MULTIHASH_HEADER.len());
        if header != MULTIHASH_HEADER {
            return Err(PeerIdParseError::Header);
        }
        Ok(Self(B256::from_slice(raw)))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.to_base58())
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        encoded.parse().map_err(de::Error::custom)
    }
}
