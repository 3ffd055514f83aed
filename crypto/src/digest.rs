//! Typed, domain-separated signing digests.
//!
//! Every authorization body signs under its own [`SigningDomain`], and every
//! action has its own type tag, so a signature collected for one action of one
//! body can never be replayed as another action or against another body.
//!
//! ```text
//! digest = blake2b( PREFIX || domain_separator || blake2b(type_tag) || field_1 || ... )
//! ```
//!
//! Fields are fixed-width and written raw.

use bastion_types::{Address, Digest, Timestamp};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};

use crate::hash::{blake2b_256, blake2b_256_multi};

type Blake2b256 = Blake2b<U32>;

const DIGEST_PREFIX: &[u8] = b"\x19bastion-typed-v1";
const DOMAIN_TAG: &[u8] = b"BastionDomain(name,version,verifyingAccount)";

/// Identifies the body (and deployment) a signature is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub verifying_account: Address,
}

impl SigningDomain {
    pub fn new(name: impl Into<String>, version: impl Into<String>, account: Address) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            verifying_account: account,
        }
    }

    /// The 32-byte domain separator.
    pub fn separator(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            &blake2b_256(DOMAIN_TAG),
            &blake2b_256(self.name.as_bytes()),
            &blake2b_256(self.version.as_bytes()),
            self.verifying_account.as_bytes(),
        ])
    }

    /// Start a digest for the action named `type_tag`.
    pub fn typed(&self, type_tag: &str) -> TypedDigest {
        let mut hasher = Blake2b256::new();
        hasher.update(DIGEST_PREFIX);
        hasher.update(self.separator());
        hasher.update(blake2b_256(type_tag.as_bytes()));
        TypedDigest { hasher }
    }
}

/// Incremental builder for one action digest.
pub struct TypedDigest {
    hasher: Blake2b256,
}

impl TypedDigest {
    pub fn bytes32(mut self, value: &[u8; 32]) -> Self {
        self.hasher.update(value);
        self
    }

    pub fn digest(self, value: &Digest) -> Self {
        self.bytes32(value.as_bytes())
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.hasher.update(value.to_be_bytes());
        self
    }

    pub fn timestamp(self, value: Timestamp) -> Self {
        self.u64(value.as_secs())
    }

    pub fn finish(self) -> Digest {
        let result = self.hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Digest::new(output)
    }
}
