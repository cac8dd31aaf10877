//! Casper key material.
//!
//! Casper account identifiers are algorithm-tagged public keys rendered as
//! hex: `01` followed by a 32-byte ed25519 key, or `02` followed by a
//! 33-byte compressed secp256k1 key. Local signing is secp256k1 only; ed25519
//! keys appear as transfer targets, validators and external approvers.

use std::fmt;

use ed25519_dalek::Verifier;
use wallet_core::BuilderError;
use wallet_primitives::bip32::ExtendedKey;
use wallet_primitives::ec::public_key::COMPRESSED_LEN;
use wallet_primitives::ec::{PrivateKey, PublicKey, Signature};
use wallet_primitives::hash::{blake2b256, sha256};
use wallet_primitives::util::ByteReader;

/// Algorithm tag of an ed25519 key or signature.
pub const ED25519_TAG: u8 = 0x01;

/// Algorithm tag of a secp256k1 key or signature.
pub const SECP256K1_TAG: u8 = 0x02;

/// Raw ed25519 public key length.
pub const ED25519_KEY_LEN: usize = 32;

/// Raw signature length for either algorithm.
pub const SIGNATURE_LEN: usize = 64;

fn invalid_key(candidate: &str, reason: impl fmt::Display) -> BuilderError {
    BuilderError::InvalidParameterValue(format!("Invalid key {}: {}", candidate, reason))
}

// ---------------------------------------------------------------------------
// CsprPublicKey
// ---------------------------------------------------------------------------

/// An algorithm-tagged Casper public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CsprPublicKey {
    /// ed25519 key (tag `01`).
    Ed25519([u8; ED25519_KEY_LEN]),
    /// secp256k1 key (tag `02`).
    Secp256k1(PublicKey),
}

impl CsprPublicKey {
    /// Parse a tagged hex address, case-insensitively.
    ///
    /// # Returns
    /// The key, or `InvalidParameterValue` for an unknown tag, a wrong length
    /// or a point that is not on the curve.
    pub fn from_hex(candidate: &str) -> Result<Self, BuilderError> {
        let bytes = hex::decode(candidate).map_err(|e| invalid_key(candidate, e))?;
        Self::from_tagged_bytes(&bytes).map_err(|e| invalid_key(candidate, e))
    }

    /// Parse a tag byte followed by the raw key.
    pub fn from_tagged_bytes(bytes: &[u8]) -> Result<Self, BuilderError> {
        let (tag, raw) = bytes
            .split_first()
            .ok_or_else(|| BuilderError::InvalidParameterValue("empty key".to_string()))?;
        match *tag {
            ED25519_TAG => Self::ed25519_from_raw(raw),
            SECP256K1_TAG => {
                if raw.len() != COMPRESSED_LEN {
                    return Err(BuilderError::InvalidParameterValue(format!(
                        "secp256k1 key must be {} bytes, got {}",
                        COMPRESSED_LEN,
                        raw.len()
                    )));
                }
                Ok(CsprPublicKey::Secp256k1(PublicKey::from_bytes(raw)?))
            }
            other => Err(BuilderError::InvalidParameterValue(format!(
                "unknown key tag {:02x}",
                other
            ))),
        }
    }

    /// Read a tagged key from a bytesrepr stream.
    pub fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, BuilderError> {
        let tag = reader.read_u8()?;
        let len = match tag {
            ED25519_TAG => ED25519_KEY_LEN,
            SECP256K1_TAG => COMPRESSED_LEN,
            other => {
                return Err(BuilderError::Parse(format!("unknown key tag {:02x}", other)));
            }
        };
        let raw = reader.read_bytes(len)?;
        let mut tagged = Vec::with_capacity(len + 1);
        tagged.push(tag);
        tagged.extend_from_slice(raw);
        Self::from_tagged_bytes(&tagged)
    }

    fn ed25519_from_raw(raw: &[u8]) -> Result<Self, BuilderError> {
        let key: [u8; ED25519_KEY_LEN] = raw.try_into().map_err(|_| {
            BuilderError::InvalidParameterValue(format!(
                "ed25519 key must be {} bytes, got {}",
                ED25519_KEY_LEN,
                raw.len()
            ))
        })?;
        ed25519_dalek::PublicKey::from_bytes(&key).map_err(|e| {
            BuilderError::InvalidParameterValue(format!("ed25519 key is not a curve point: {}", e))
        })?;
        Ok(CsprPublicKey::Ed25519(key))
    }

    /// Algorithm tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            CsprPublicKey::Ed25519(_) => ED25519_TAG,
            CsprPublicKey::Secp256k1(_) => SECP256K1_TAG,
        }
    }

    /// Lowercase algorithm name used in account hash derivation.
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            CsprPublicKey::Ed25519(_) => "ed25519",
            CsprPublicKey::Secp256k1(_) => "secp256k1",
        }
    }

    /// Key bytes without the tag.
    pub fn raw_bytes(&self) -> Vec<u8> {
        match self {
            CsprPublicKey::Ed25519(key) => key.to_vec(),
            CsprPublicKey::Secp256k1(key) => key.to_compressed().to_vec(),
        }
    }

    /// Tag byte followed by the key bytes.
    pub fn to_tagged_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.tag()];
        out.extend(self.raw_bytes());
        out
    }

    /// Lowercase tagged hex: the Casper account address.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_tagged_bytes())
    }

    /// `blake2b256(algorithm_name || 0x00 || raw key)`.
    pub fn account_hash(&self) -> [u8; 32] {
        let mut preimage = self.algorithm_name().as_bytes().to_vec();
        preimage.push(0);
        preimage.extend(self.raw_bytes());
        blake2b256(&preimage)
    }

    /// Verify a tagged signature over `message` (a deploy hash).
    ///
    /// secp256k1 approvals sign `sha256(message)`; ed25519 approvals sign
    /// the message itself.
    pub fn verify(&self, message: &[u8], tagged_signature: &[u8]) -> bool {
        let Some((tag, sig)) = tagged_signature.split_first() else {
            return false;
        };
        if *tag != self.tag() || sig.len() != SIGNATURE_LEN {
            return false;
        }
        match self {
            CsprPublicKey::Secp256k1(key) => match Signature::from_bytes(sig) {
                Ok(signature) => key.verify(&sha256(message), &signature),
                Err(_) => false,
            },
            CsprPublicKey::Ed25519(raw) => {
                let Ok(key) = ed25519_dalek::PublicKey::from_bytes(raw) else {
                    return false;
                };
                let Ok(signature) = ed25519_dalek::Signature::try_from(sig) else {
                    return false;
                };
                key.verify(message, &signature).is_ok()
            }
        }
    }
}

impl fmt::Display for CsprPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A secp256k1 key pair, optionally public-only.
///
/// Accepts raw hex keys and BIP32 extended keys; both forms of the same key
/// produce identical signatures and addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self::from_private_key(PrivateKey::new())
    }

    /// Derive the BIP32 master key pair from a seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, BuilderError> {
        let master = ExtendedKey::from_seed(seed)?;
        match master.private_key() {
            Some(key) => Ok(Self::from_private_key(key.clone())),
            None => Err(BuilderError::InvalidParameterValue(
                "seed did not produce a private key".to_string(),
            )),
        }
    }

    /// Wrap an existing private key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.pub_key();
        KeyPair {
            private_key: Some(private_key),
            public_key,
        }
    }

    /// Wrap a public key; the pair cannot sign.
    pub fn from_public_key(public_key: PublicKey) -> Self {
        KeyPair {
            private_key: None,
            public_key,
        }
    }

    /// Parse a private key given as 64 hex characters or an extended
    /// private key (`xprv`/`tprv`).
    pub fn from_private(candidate: &str) -> Result<Self, BuilderError> {
        if candidate.len() == 64 {
            let key = PrivateKey::from_hex(candidate).map_err(|e| invalid_key(candidate, e))?;
            return Ok(Self::from_private_key(key));
        }
        let extended = ExtendedKey::from_string(candidate).map_err(|e| invalid_key(candidate, e))?;
        match extended.private_key() {
            Some(key) => Ok(Self::from_private_key(key.clone())),
            None => Err(invalid_key(candidate, "not a private key")),
        }
    }

    /// Parse a public key given as SEC1 hex (compressed or uncompressed), a
    /// `02`-tagged Casper address, or an extended key.
    pub fn from_public(candidate: &str) -> Result<Self, BuilderError> {
        let is_hex = candidate.bytes().all(|b| b.is_ascii_hexdigit());
        if is_hex && candidate.len() == 68 {
            return match CsprPublicKey::from_hex(candidate)? {
                CsprPublicKey::Secp256k1(key) => Ok(Self::from_public_key(key)),
                CsprPublicKey::Ed25519(_) => Err(invalid_key(candidate, "not a secp256k1 key")),
            };
        }
        if is_hex {
            let key = PublicKey::from_hex(candidate).map_err(|e| invalid_key(candidate, e))?;
            return Ok(Self::from_public_key(key));
        }
        let extended = ExtendedKey::from_string(candidate).map_err(|e| invalid_key(candidate, e))?;
        Ok(Self::from_public_key(extended.public_key()))
    }

    /// Parse either a private or a public key.
    pub fn from_any(candidate: &str) -> Result<Self, BuilderError> {
        Self::from_private(candidate).or_else(|_| Self::from_public(candidate))
    }

    /// The secp256k1 public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The private key, if present.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// Whether this pair can sign.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// The tagged Casper public key.
    pub fn cspr_public_key(&self) -> CsprPublicKey {
        CsprPublicKey::Secp256k1(self.public_key.clone())
    }

    /// The Casper account address (`02` + compressed key, lowercase hex).
    pub fn address(&self) -> String {
        self.cspr_public_key().to_hex()
    }

    /// Sign `message` (a deploy hash) and return the tagged signature bytes.
    ///
    /// # Returns
    /// `02 || r || s` with low S, or `Signing` when the pair is public-only.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BuilderError> {
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| BuilderError::Signing("Missing private key".to_string()))?;
        let signature = key.sign(&sha256(message))?;
        let mut tagged = Vec::with_capacity(SIGNATURE_LEN + 1);
        tagged.push(SECP256K1_TAG);
        tagged.extend_from_slice(&signature.to_bytes());
        Ok(tagged)
    }

    /// Sign an arbitrary message, for proving key ownership off chain.
    ///
    /// Same scheme as deploy approvals but without the tag byte: the result
    /// is the bare 64-byte `r || s` over `sha256(message)`.
    pub fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, BuilderError> {
        let mut signature = self.sign(message)?;
        signature.remove(0);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRV: &str = "07e998012c1137decdf3efbbb1c3ee6d79b015638cbc197bdbcce1875de4faad";
    const PUB: &str = "02a1d59c993d7dcb91febde94fd3327f874c995a154dca4f7244e04724fb4c30c3";
    const XPRV: &str = "xprv9s21ZrQH143K3p1FEwoGy1wtkUpVFRDH8iTF9gb9T3X9M4LVZk47DvwMsxopVMfCccdZapDYtTiGHxz78m82ysnDjrm48hcQ8erREmKA4xz";
    const XPUB: &str = "xpub661MyMwAqRbcGJ5iLyLHL9tdJWeyesw8VwNqx4zm1P48Drfe7HNMmjFqjF1NfJkYNN5EaRjvfWEfCZCfN4w39hX7LfpHFwc8bHA6WRiK1aH";
    const ED25519: &str = "01513fa90c1a74c34a8958dd86055e9736edb1ead918bd4d4d750ca851946be7aa";

    #[test]
    fn test_address_from_private_and_extended_keys_agree() {
        let raw = KeyPair::from_private(PRV).unwrap();
        let xprv = KeyPair::from_private(XPRV).unwrap();
        let xpub = KeyPair::from_public(XPUB).unwrap();
        let expected = format!("02{}", PUB);
        assert_eq!(raw.address(), expected);
        assert_eq!(xprv.address(), expected);
        assert_eq!(xpub.address(), expected);
        assert!(!xpub.has_private_key());
    }

    #[test]
    fn test_from_public_accepts_tagged_address() {
        let kp = KeyPair::from_public(&format!("02{}", PUB.to_uppercase())).unwrap();
        assert_eq!(kp.public_key().to_hex(), PUB);
    }

    #[test]
    fn test_from_public_rejects_ed25519_address() {
        assert!(KeyPair::from_public(ED25519).is_err());
    }

    #[test]
    fn test_from_private_rejects_garbage() {
        assert!(KeyPair::from_private("zz").is_err());
        assert!(KeyPair::from_private(XPUB).is_err());
        assert!(KeyPair::from_private(&"00".repeat(32)).is_err());
    }

    #[test]
    fn test_public_key_parse_is_case_insensitive() {
        let lower = CsprPublicKey::from_hex(ED25519).unwrap();
        let upper = CsprPublicKey::from_hex(&ED25519.to_uppercase()).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_hex(), ED25519);
        assert_eq!(lower.tag(), ED25519_TAG);
    }

    #[test]
    fn test_public_key_rejects_bad_encodings() {
        // wrong tag
        assert!(CsprPublicKey::from_hex(&format!("03{}", PUB)).is_err());
        // secp256k1 body under ed25519 tag
        assert!(CsprPublicKey::from_hex(&format!("01{}", PUB)).is_err());
        // not an ed25519 point
        assert!(CsprPublicKey::from_hex(&format!("01{}", "02".repeat(32))).is_err());
        // truncated
        assert!(CsprPublicKey::from_hex(&format!("02{}", &PUB[..64])).is_err());
        assert!(CsprPublicKey::from_hex("").is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::from_private(PRV).unwrap();
        let message = blake2b256(b"deploy header");
        let sig = kp.sign(&message).unwrap();
        assert_eq!(sig.len(), 65);
        assert_eq!(sig[0], SECP256K1_TAG);
        let key = kp.cspr_public_key();
        assert!(key.verify(&message, &sig));
        assert!(!key.verify(&blake2b256(b"other"), &sig));

        let mut wrong_tag = sig.clone();
        wrong_tag[0] = ED25519_TAG;
        assert!(!key.verify(&message, &wrong_tag));
    }

    #[test]
    fn test_extended_and_raw_keys_sign_identically() {
        let message = blake2b256(b"m");
        let raw = KeyPair::from_private(PRV).unwrap().sign(&message).unwrap();
        let xprv = KeyPair::from_private(XPRV).unwrap().sign(&message).unwrap();
        assert_eq!(raw, xprv);
    }

    #[test]
    fn test_sign_message_with_raw_and_extended_keys() {
        let message = hex::decode("6ca8b0e0cd1a2a2b0b4dd6a0a2eb7c7a8d94f5a0b3e1c2d4f6a8b0c2d4e6f809").unwrap();
        let raw = KeyPair::from_private(PRV).unwrap().sign_message(&message).unwrap();
        let extended = KeyPair::from_private(XPRV).unwrap().sign_message(&message).unwrap();
        assert_eq!(raw.len(), SIGNATURE_LEN);
        assert_eq!(raw, extended);

        let key = CsprPublicKey::from_hex(&format!("02{}", PUB)).unwrap();
        let tagged = [vec![SECP256K1_TAG], raw].concat();
        assert!(key.verify(&message, &tagged));
        assert!(!key.verify(b"other message", &tagged));
    }

    #[test]
    fn test_public_only_pair_cannot_sign_message() {
        let err = KeyPair::from_public(XPUB).unwrap().sign_message(b"hello").unwrap_err();
        assert!(matches!(err, BuilderError::Signing(_)));
    }

    #[test]
    fn test_public_only_pair_cannot_sign() {
        let kp = KeyPair::from_public(XPUB).unwrap();
        let err = kp.sign(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, BuilderError::Signing(_)));
    }

    #[test]
    fn test_read_from_stream() {
        let key = CsprPublicKey::from_hex(ED25519).unwrap();
        let mut bytes = key.to_tagged_bytes();
        bytes.push(0xaa);
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(CsprPublicKey::read_from(&mut reader).unwrap(), key);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_account_hash_depends_on_algorithm() {
        let ed = CsprPublicKey::from_hex(ED25519).unwrap();
        let mut preimage = b"ed25519".to_vec();
        preimage.push(0);
        preimage.extend(&ed.raw_bytes());
        assert_eq!(ed.account_hash(), blake2b256(&preimage));

        let generated = KeyPair::generate().cspr_public_key();
        assert_ne!(generated.account_hash(), ed.account_hash());
    }
}
