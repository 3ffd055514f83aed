//! Signature validation for a single principal.
//!
//! A principal is either a plain Ed25519 key (its address is the public key)
//! or a registered delegated account that decides validity itself, such as a
//! [`Multisig`](crate::Multisig) signing on behalf of its members.

use bastion_crypto::verify_digest;
use bastion_types::{Address, Digest, PublicKey, Signature};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maximum nesting of delegated accounts (a multisig whose member is a
/// multisig whose member is ...). Deeper chains, including cycles, are invalid.
pub const MAX_DELEGATION_DEPTH: usize = 4;

/// An account that validates signatures made on its behalf.
pub trait DelegatedSigner: Send + Sync {
    /// Whether `signature` is a valid authorization of `digest` by this account.
    fn is_valid_signature(
        &self,
        delegation: &Delegation<'_>,
        digest: &Digest,
        signature: &[u8],
    ) -> bool;
}

/// Handle given to a [`DelegatedSigner`] so it can validate its own members
/// one delegation level deeper.
pub struct Delegation<'a> {
    checker: &'a SignatureChecker,
    depth: usize,
}

impl Delegation<'_> {
    pub fn is_valid_signature(&self, signer: &Address, digest: &Digest, signature: &[u8]) -> bool {
        self.checker
            .check_at_depth(signer, digest, signature, self.depth + 1)
    }
}

/// Registry of delegated accounts plus the direct-signature fallback.
#[derive(Default, Clone)]
pub struct SignatureChecker {
    accounts: HashMap<Address, Arc<dyn DelegatedSigner>>,
}

impl SignatureChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the delegated account at `address`.
    pub fn register(&mut self, address: Address, account: Arc<dyn DelegatedSigner>) {
        self.accounts.insert(address, account);
    }

    /// Whether `signature` is currently a valid authorization of `digest` by `signer`.
    pub fn is_valid_signature_now(
        &self,
        signer: &Address,
        digest: &Digest,
        signature: &[u8],
    ) -> bool {
        self.check_at_depth(signer, digest, signature, 0)
    }

    fn check_at_depth(
        &self,
        signer: &Address,
        digest: &Digest,
        signature: &[u8],
        depth: usize,
    ) -> bool {
        if depth > MAX_DELEGATION_DEPTH {
            debug!(%signer, depth, "delegation depth exceeded");
            return false;
        }
        match self.accounts.get(signer) {
            Some(account) => {
                let delegation = Delegation {
                    checker: self,
                    depth,
                };
                account.is_valid_signature(&delegation, digest, signature)
            }
            None => {
                let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
                    return false;
                };
                verify_digest(digest, &Signature(bytes), &PublicKey(*signer.as_bytes()))
            }
        }
    }
}

impl std::fmt::Debug for SignatureChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureChecker")
            .field("delegated_accounts", &self.accounts.keys().collect::<Vec<_>>())
            .finish()
    }
}
