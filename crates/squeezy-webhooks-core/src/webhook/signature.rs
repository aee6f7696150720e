//! Webhook signature verification.
//!
//! Lemon Squeezy signs every delivery with HMAC-SHA256 keyed by the webhook's
//! signing secret and sends the lower-case hex digest in `x-signature`.
//! There is no prefix and no timestamp component.

use crate::{SecretError, WebhookSecret};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies `x-signature` values against a fixed secret.
///
/// The keyed HMAC state is prepared once and cloned per request, so the
/// verifier can be shared freely between concurrent dispatches.
#[derive(Clone)]
pub struct SignatureVerifier {
    keyed: HmacSha256,
}

impl SignatureVerifier {
    /// Create a verifier for the given secret.
    pub fn new(secret: &WebhookSecret) -> Result<Self, SecretError> {
        let keyed = HmacSha256::new_from_slice(secret.expose_bytes())
            .map_err(|_| SecretError::InvalidKey)?;
        Ok(Self { keyed })
    }

    /// Hex-encoded HMAC-SHA256 of `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.keyed.clone();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check `signature` against the digest of `body`.
    ///
    /// The comparison runs over the hex text in constant time. A signature of
    /// a different length, including an empty one, is simply not equal.
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let digest = self.sign(body);
        digest.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}

// Security: Don't expose key material in debug output
impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("key", &"<REDACTED>")
            .finish()
    }
}

/// Compute the `x-signature` value for `body`.
pub fn compute_signature(secret: &WebhookSecret, body: &[u8]) -> Result<String, SecretError> {
    Ok(SignatureVerifier::new(secret)?.sign(body))
}

/// Verify a signature header value against `body`.
///
/// Never fails: any problem, including an unusable secret, yields `false`.
pub fn verify(secret: &WebhookSecret, body: &[u8], signature: &str) -> bool {
    SignatureVerifier::new(secret)
        .map(|verifier| verifier.verify(body, signature))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
