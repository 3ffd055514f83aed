//! Signature bundles submitted with body actions.

use crate::error::GovernanceError;
use bastion_crypto::sign_digest;
use bastion_multisig::MultisigSignature;
use bastion_types::{Address, Digest, KeyPair, Timestamp};
use serde::{Deserialize, Serialize};

/// Signers (ascending by address) paired index-for-index with their signatures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approvals {
    pub signers: Vec<Address>,
    pub signatures: Vec<Vec<u8>>,
}

impl Approvals {
    /// Sign `digest` with every key, ordering the result by signer address.
    pub fn sign(digest: &Digest, keys: &[&KeyPair]) -> Self {
        let mut signed: Vec<(Address, Vec<u8>)> = keys
            .iter()
            .map(|k| (k.address(), sign_digest(digest, &k.private).to_vec()))
            .collect();
        signed.sort_by_key(|(address, _)| *address);
        let (signers, signatures) = signed.into_iter().unzip();
        Self {
            signers,
            signatures,
        }
    }

    /// Encode as a single signature of the multisig these signers belong to.
    pub fn to_delegated_signature(&self) -> Result<Vec<u8>, GovernanceError> {
        let encoded = MultisigSignature {
            signers: self.signers.clone(),
            signatures: self.signatures.clone(),
        }
        .encode()?;
        Ok(encoded)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Nonce-bound approvals carry a deadline; at `valid_until` they are dead.
pub fn ensure_not_expired(valid_until: Timestamp, now: Timestamp) -> Result<(), GovernanceError> {
    if now >= valid_until {
        return Err(GovernanceError::SignatureExpired { valid_until, now });
    }
    Ok(())
}
