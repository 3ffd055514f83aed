//! Cryptographic primitives for Bastion governance.
//!
//! - **Ed25519** for member signatures
//! - **Blake2b** for hashing (proposal ids, digests)
//! - **Typed digests**: domain-separated, per-action signing payloads

pub mod digest;
pub mod hash;
pub mod keys;
pub mod sign;

use thiserror::Error;

pub use digest::{SigningDomain, TypedDigest};
pub use hash::{blake2b_256, blake2b_256_multi, encode_proposal, hash_encoded, proposal_id};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_digest, sign_message, verify_digest, verify_signature};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("randomness unavailable: {0}")]
    Randomness(String),
}
