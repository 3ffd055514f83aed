//! Threshold signature authorization.
//!
//! A [`Multisig`] is a fixed, sorted set of principals and a threshold. It
//! answers one question: did at least *k* distinct members sign this exact
//! digest? It has no side effects and no nonces; replay protection is the job
//! of the bodies built on top of it.
//!
//! Principals may be plain Ed25519 keys or delegated accounts registered in a
//! [`SignatureChecker`] (for instance another multisig), which lets a whole
//! body act as a single signer.

pub mod checker;
pub mod error;
pub mod multisig;

pub use checker::{Delegation, DelegatedSigner, SignatureChecker, MAX_DELEGATION_DEPTH};
pub use error::MultisigError;
pub use multisig::{Multisig, MultisigSignature};
