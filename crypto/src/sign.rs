//! Ed25519 message signing and verification.

use ed25519_dalek::{Signer, Verifier};

use burst_types::{PrivateKey, PublicKey, Signature};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `false` (rather than propagating an error) for a malformed
/// public key, matching the caller's expectation that this is a plain
/// boolean check used on the hot validation path.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key.verify(message, &sig).is_ok()
}

/// Verify a batch of (message, signature, public_key) triples in one call.
///
/// Used by the vote processor (§4.5) to amortize signature verification
/// across an entire drained batch rather than checking one at a time.
pub fn verify_batch(items: &[(&[u8], &Signature, &PublicKey)]) -> Vec<bool> {
    items
        .iter()
        .map(|(msg, sig, pk)| verify_signature(msg, sig, pk))
        .collect()
}
