//! Ed25519 message signing and verification.

use bastion_types::{Digest, PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Sign a governance digest.
pub fn sign_digest(digest: &Digest, private_key: &PrivateKey) -> Signature {
    sign_message(digest.as_bytes(), private_key)
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
/// Uses strict verification, which rejects non-canonical signatures and
/// small-order keys (malleability protection).
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify_strict(message, &dalek_sig).is_ok()
}

/// Verify a signature over a governance digest.
pub fn verify_digest(digest: &Digest, signature: &Signature, public_key: &PublicKey) -> bool {
    verify_signature(digest.as_bytes(), signature, public_key)
}
