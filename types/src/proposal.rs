//! Upgrade proposals: the payload that governance gates.

use crate::hash::Address;
use serde::{Deserialize, Serialize};

/// A single outbound call executed as part of an upgrade.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    /// Where the call goes.
    pub target: Address,
    /// Native value attached to the call.
    #[serde(default)]
    pub value: u128,
    /// Opaque call payload.
    #[serde(default, with = "hex_payload")]
    pub data: Vec<u8>,
}

/// An upgrade proposal.
///
/// Proposals are content-addressed: the id is the hash of the canonical
/// encoding of all three fields, so two proposals with identical calls,
/// executor and salt are the same upgrade.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeProposal {
    /// Ordered call batch.
    pub calls: Vec<Call>,
    /// Only this address may execute; [`Address::ZERO`] means anyone.
    #[serde(default)]
    pub executor: Address,
    /// Uniqueness salt.
    #[serde(default)]
    pub salt: [u8; 32],
}

impl UpgradeProposal {
    /// Whether `caller` may execute this proposal once it is ready.
    pub fn can_be_executed_by(&self, caller: &Address) -> bool {
        self.executor.is_zero() || self.executor == *caller
    }
}

/// Payload bytes are hex in human-readable formats and raw in binary ones.
mod hex_payload {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&format!("0x{}", hex::encode(data)))
        } else {
            serializer.serialize_bytes(data)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
        } else {
            serde_bytes_vec(deserializer)
        }
    }

    fn serde_bytes_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        struct BytesVisitor;

        impl<'de> serde::de::Visitor<'de> for BytesVisitor {
            type Value = Vec<u8>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a byte buffer")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(v.to_vec())
            }

            fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(v)
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some(b) = seq.next_element()? {
                    out.push(b);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}
