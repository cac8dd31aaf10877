//! secp256k1 verifying keys in SEC1 form.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// `0x02`/`0x03` prefix plus x.
pub const COMPRESSED_LEN: usize = 33;

/// `0x04` prefix plus x and y.
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
///
/// Two keys are equal when their points are equal, whichever SEC1 form they
/// were read from.
#[derive(Clone, Debug)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a compressed or uncompressed SEC1 point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        match bytes.len() {
            COMPRESSED_LEN | UNCOMPRESSED_LEN => VerifyingKey::from_sec1_bytes(bytes)
                .map(|inner| PublicKey { inner })
                .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string())),
            n => Err(PrimitivesError::InvalidPublicKey(format!(
                "{} bytes is neither {} nor {}",
                n, COMPRESSED_LEN, UNCOMPRESSED_LEN
            ))),
        }
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        self.encode::<COMPRESSED_LEN>(true)
    }

    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        self.encode::<UNCOMPRESSED_LEN>(false)
    }

    /// Compressed form as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Check `sig` over a 32-byte digest.
    pub fn verify(&self, digest: &[u8], sig: &Signature) -> bool {
        sig.verify(digest, self)
    }

    fn encode<const N: usize>(&self, compress: bool) -> [u8; N] {
        let point = self.inner.to_encoded_point(compress);
        let mut out = [0u8; N];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
