//! 32-byte identifiers: addresses, digests, and proposal ids.
//!
//! All of them share one representation, so a single macro provides the
//! constructors, hex formatting, parsing, and serde support. Human-readable
//! formats (TOML, JSON) see a hex string; binary formats (bincode) see raw bytes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing a 32-byte value from hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBytesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

macro_rules! bytes32 {
    ($name:ident, $label:literal) => {
        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}\u{2026})"), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseBytesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix("0x").unwrap_or(s);
                let bytes =
                    hex::decode(raw).map_err(|e| ParseBytesError::InvalidHex(e.to_string()))?;
                let len = bytes.len();
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| ParseBytesError::InvalidLength(len))?;
                Ok(Self(arr))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_string())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(serde::de::Error::custom)
                } else {
                    <[u8; 32]>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

/// A principal or contract address.
///
/// For key-backed principals the address is the Ed25519 public key itself;
/// delegated accounts (multisigs) are registered under an arbitrary address.
/// The zero address is the "anyone" / unset marker.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 32]);

bytes32!(Address, "Address");

/// A 32-byte Blake2b digest: what signers actually sign.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

bytes32!(Digest, "Digest");

/// Content hash of an [`UpgradeProposal`](crate::UpgradeProposal).
pub type ProposalId = Digest;
