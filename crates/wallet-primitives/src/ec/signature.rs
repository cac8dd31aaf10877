//! Compact secp256k1 signatures.
//!
//! Approvals carry the bare 64-byte `r || s` form, not DER. Signing uses
//! RFC6979 nonces and always yields a low-S signature.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a compact signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Length of the digest accepted by `sign`.
pub const DIGEST_LEN: usize = 32;

/// A secp256k1 ECDSA signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature(ecdsa::Signature);

impl Signature {
    /// Parse a 64-byte `r || s` signature.
    ///
    /// # Returns
    /// The signature, or `InvalidSignature` for a wrong length or a zero or
    /// out-of-range scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            )));
        }
        ecdsa::Signature::from_slice(bytes)
            .map(Signature)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Whether S lies in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        self.0.normalize_s().is_none()
    }

    /// Sign a 32-byte digest.
    pub fn sign(digest: &[u8], key: &PrivateKey) -> Result<Self, PrimitivesError> {
        if digest.len() != DIGEST_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "digest must be {} bytes, got {}",
                DIGEST_LEN,
                digest.len()
            )));
        }
        let sig: ecdsa::Signature = key
            .signing_key()
            .sign_prehash(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature(sig.normalize_s().unwrap_or(sig)))
    }

    /// Verify against a 32-byte digest. High-S signatures are rejected.
    pub fn verify(&self, digest: &[u8], key: &PublicKey) -> bool {
        key.verifying_key().verify_prehash(digest, &self.0).is_ok()
    }
}
