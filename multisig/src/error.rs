use bastion_types::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultisigError {
    #[error("invalid threshold {threshold} for {members} members")]
    InvalidThreshold { threshold: usize, members: usize },

    #[error("member set must contain exactly {expected} members, got {actual}")]
    WrongMemberCount { expected: usize, actual: usize },

    #[error("zero address cannot be a member")]
    ZeroAddressMember,

    #[error("members not sorted or duplicate found")]
    MembersNotSorted,

    #[error("insufficient signatures: {provided} < {threshold}")]
    InsufficientSignatures { provided: usize, threshold: usize },

    #[error("inconsistent signers/signatures length: {signers} != {signatures}")]
    LengthMismatch { signers: usize, signatures: usize },

    #[error("signer {0} is not a member")]
    NotAMember(Address),

    #[error("signers not sorted or duplicate signer found at {0}")]
    SignersNotOrdered(Address),

    #[error("invalid signature from {0}")]
    InvalidSignature(Address),

    #[error("malformed multisig signature: {0}")]
    MalformedSignature(String),

    #[error("failed to encode multisig signature: {0}")]
    Encoding(String),
}
