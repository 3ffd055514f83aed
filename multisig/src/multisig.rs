//! The k-of-n threshold primitive shared by every authorization body.

use crate::checker::{Delegation, DelegatedSigner, SignatureChecker};
use crate::error::MultisigError;
use bastion_types::{Address, Digest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A fixed, strictly ascending member set with a default threshold.
///
/// The default (`delegation_threshold`) applies when this multisig signs as a
/// single principal for someone else; body actions pass their own per-action
/// threshold to [`Multisig::check_signatures`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Multisig {
    members: Vec<Address>,
    delegation_threshold: usize,
}

/// Signature bytes a multisig produces when acting as a single principal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigSignature {
    pub signers: Vec<Address>,
    pub signatures: Vec<Vec<u8>>,
}

impl MultisigSignature {
    pub fn encode(&self) -> Result<Vec<u8>, MultisigError> {
        bincode::serialize(self).map_err(|e| MultisigError::Encoding(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, MultisigError> {
        bincode::deserialize(bytes).map_err(|e| MultisigError::MalformedSignature(e.to_string()))
    }
}

impl Multisig {
    /// Build a member set.
    ///
    /// Members must be non-zero and strictly ascending (which also rules out
    /// duplicates); `0 < delegation_threshold <= members.len()`.
    pub fn new(members: Vec<Address>, delegation_threshold: usize) -> Result<Self, MultisigError> {
        if delegation_threshold == 0 || delegation_threshold > members.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold: delegation_threshold,
                members: members.len(),
            });
        }
        if members.iter().any(Address::is_zero) {
            return Err(MultisigError::ZeroAddressMember);
        }
        if members.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MultisigError::MembersNotSorted);
        }
        Ok(Self {
            members,
            delegation_threshold,
        })
    }

    /// Like [`Multisig::new`], but also requires an exact member count.
    pub fn with_exact_size(
        members: Vec<Address>,
        expected: usize,
        delegation_threshold: usize,
    ) -> Result<Self, MultisigError> {
        if members.len() != expected {
            return Err(MultisigError::WrongMemberCount {
                expected,
                actual: members.len(),
            });
        }
        Self::new(members, delegation_threshold)
    }

    pub fn members(&self) -> &[Address] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.members.binary_search(address).is_ok()
    }

    pub fn delegation_threshold(&self) -> usize {
        self.delegation_threshold
    }

    /// Verify that at least `threshold` members signed `digest`.
    ///
    /// `signers` must be a strictly ascending subset of the members, paired
    /// index-for-index with `signatures`.
    pub fn check_signatures(
        &self,
        checker: &SignatureChecker,
        digest: &Digest,
        signers: &[Address],
        signatures: &[Vec<u8>],
        threshold: usize,
    ) -> Result<(), MultisigError> {
        self.check_with(digest, signers, signatures, threshold, |signer, sig| {
            checker.is_valid_signature_now(signer, digest, sig)
        })
    }

    fn check_with(
        &self,
        digest: &Digest,
        signers: &[Address],
        signatures: &[Vec<u8>],
        threshold: usize,
        verify: impl Fn(&Address, &[u8]) -> bool,
    ) -> Result<(), MultisigError> {
        if threshold == 0 {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                members: self.members.len(),
            });
        }
        if signatures.len() < threshold {
            return Err(MultisigError::InsufficientSignatures {
                provided: signatures.len(),
                threshold,
            });
        }
        if signers.len() != signatures.len() {
            return Err(MultisigError::LengthMismatch {
                signers: signers.len(),
                signatures: signatures.len(),
            });
        }

        // Members are sorted, so one forward pass both checks membership and
        // enforces ascending, duplicate-free signers.
        let mut cursor = 0;
        for signer in signers {
            while cursor < self.members.len() && self.members[cursor] < *signer {
                cursor += 1;
            }
            if cursor == self.members.len() || self.members[cursor] != *signer {
                return Err(if self.is_member(signer) {
                    MultisigError::SignersNotOrdered(*signer)
                } else {
                    MultisigError::NotAMember(*signer)
                });
            }
            cursor += 1;
        }

        for (signer, signature) in signers.iter().zip(signatures) {
            if !verify(signer, signature) {
                debug!(%signer, %digest, "signature rejected");
                return Err(MultisigError::InvalidSignature(*signer));
            }
        }
        Ok(())
    }
}

impl DelegatedSigner for Multisig {
    fn is_valid_signature(
        &self,
        delegation: &Delegation<'_>,
        digest: &Digest,
        signature: &[u8],
    ) -> bool {
        let Ok(decoded) = MultisigSignature::decode(signature) else {
            return false;
        };
        self.check_with(
            digest,
            &decoded.signers,
            &decoded.signatures,
            self.delegation_threshold,
            |signer, sig| delegation.is_valid_signature(signer, digest, sig),
        )
        .is_ok()
    }
}
