//! Blake2b hashing for digests and proposal ids.

use bastion_types::{Digest, ProposalId, UpgradeProposal};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use serde::Serialize;

use crate::CryptoError;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Canonical binary encoding of a proposal.
///
/// This is the message body the remote governor emits, and the preimage of
/// the proposal id.
pub fn encode_proposal(proposal: &UpgradeProposal) -> Result<Vec<u8>, CryptoError> {
    bincode::serialize(proposal).map_err(|e| CryptoError::Encoding(e.to_string()))
}

/// Blake2b of the canonical binary encoding of `value`.
pub fn hash_encoded<T: Serialize + ?Sized>(value: &T) -> Result<Digest, CryptoError> {
    let encoded = bincode::serialize(value).map_err(|e| CryptoError::Encoding(e.to_string()))?;
    Ok(Digest::new(blake2b_256(&encoded)))
}

/// Content-addressed proposal id: `blake2b(encode(proposal))`.
pub fn proposal_id(proposal: &UpgradeProposal) -> Result<ProposalId, CryptoError> {
    let encoded = encode_proposal(proposal)?;
    Ok(Digest::new(blake2b_256(&encoded)))
}
