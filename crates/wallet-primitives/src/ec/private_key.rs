//! secp256k1 signing keys.
//!
//! The scalar lives inside a k256 `SigningKey`, which wipes itself on drop.
//! Copies handed out by `to_bytes` are the caller's to wipe.

use std::fmt;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Size of a raw scalar.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A key able to approve deploys.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Fresh key from the OS RNG.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Load a raw big-endian scalar.
    ///
    /// # Returns
    /// `InvalidKeyLength` unless exactly 32 bytes are given, `InvalidPrivateKey`
    /// for zero or for a value not below the group order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: PRIVATE_KEY_BYTES_LEN,
                got: bytes.len(),
            });
        }
        SigningKey::from_slice(bytes)
            .map(|inner| PrivateKey { inner })
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey("empty key".into()));
        }
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES_LEN] {
        self.inner.to_bytes().into()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest. See [`Signature::sign`].
    pub fn sign(&self, digest: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(digest, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for PrivateKey {}

// Only the public half is printed.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("pub_key", &self.pub_key().to_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    const ACCOUNT_1_PRV: &str = "07e998012c1137decdf3efbbb1c3ee6d79b015638cbc197bdbcce1875de4faad";
    const ACCOUNT_1_PUB: &str = "02a1d59c993d7dcb91febde94fd3327f874c995a154dca4f7244e04724fb4c30c3";

    #[test]
    fn test_known_key_derives_known_public_key() {
        let key = PrivateKey::from_hex(ACCOUNT_1_PRV).unwrap();
        assert_eq!(key.pub_key().to_hex(), ACCOUNT_1_PUB);
        assert_eq!(key.to_hex(), ACCOUNT_1_PRV);
    }

    #[test]
    fn test_signature_verifies_under_own_public_key() {
        let key = PrivateKey::from_hex(ACCOUNT_1_PRV).unwrap();
        let digest = sha256(b"deploy hash bytes");
        let sig = key.sign(&digest).unwrap();
        assert!(key.pub_key().verify(&digest, &sig));
    }

    #[test]
    fn test_raw_and_hex_forms_reload() {
        let pk = PrivateKey::new();
        assert_eq!(pk, PrivateKey::from_bytes(&pk.to_bytes()).unwrap());
        assert_eq!(pk, PrivateKey::from_hex(&pk.to_hex()).unwrap());
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(PrivateKey::from_hex("").is_err());
        assert!(PrivateKey::from_hex("zz").is_err());
        assert!(matches!(
            PrivateKey::from_bytes(&[1u8; 31]),
            Err(PrimitivesError::InvalidKeyLength { expected: 32, got: 31 })
        ));
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        let order =
            hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").unwrap();
        assert!(PrivateKey::from_bytes(&order).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let key = PrivateKey::from_hex(ACCOUNT_1_PRV).unwrap();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains(ACCOUNT_1_PRV));
        assert!(rendered.contains(ACCOUNT_1_PUB));
    }
}
