//! Fundamental types for Bastion upgrade governance.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, digests, keys, timestamps, upgrade proposals, and timing parameters.

pub mod hash;
pub mod keys;
pub mod params;
pub mod proposal;
pub mod time;

pub use hash::{Address, Digest, ParseBytesError, ProposalId};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use params::GovernanceParams;
pub use proposal::{Call, UpgradeProposal};
pub use time::Timestamp;
