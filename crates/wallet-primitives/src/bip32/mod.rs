//! BIP32 extended key serialization.
//!
//! Decodes and encodes the 78-byte Base58Check payload of `xprv`, `xpub`,
//! `tprv` and `tpub` strings. Wallets hand signing keys around in this form;
//! the embedded key is used directly, so an extended key and its raw form
//! resolve to the same effective key material.
//!
//! | Field              | Size     |
//! |--------------------|----------|
//! | version            | 4 bytes  |
//! | depth              | 1 byte   |
//! | parent fingerprint | 4 bytes  |
//! | child number       | 4 bytes (BE) |
//! | chain code         | 32 bytes |
//! | key                | 33 bytes (`0x00 || prv` or compressed pub) |

use crate::base58;
use crate::ec::{PrivateKey, PublicKey};
use crate::hash::sha512_hmac;
use crate::PrimitivesError;

use zeroize::Zeroize;

/// Serialized payload length (without checksum).
const EXTENDED_KEY_LEN: usize = 78;

/// HMAC key for master key generation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Mainnet private version bytes (`xprv`).
pub const MAINNET_PRIVATE: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
/// Mainnet public version bytes (`xpub`).
pub const MAINNET_PUBLIC: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];
/// Testnet private version bytes (`tprv`).
pub const TESTNET_PRIVATE: [u8; 4] = [0x04, 0x35, 0x83, 0x94];
/// Testnet public version bytes (`tpub`).
pub const TESTNET_PUBLIC: [u8; 4] = [0x04, 0x35, 0x87, 0xcf];

/// Key material carried by an extended key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtendedKeyMaterial {
    /// Private half (`xprv`/`tprv`).
    Private(PrivateKey),
    /// Public half (`xpub`/`tpub`).
    Public(PublicKey),
}

/// A decoded BIP32 extended key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedKey {
    /// Version bytes identifying network and key kind.
    pub version: [u8; 4],
    /// Derivation depth (0 for master keys).
    pub depth: u8,
    /// First four bytes of the parent key's identifier.
    pub parent_fingerprint: [u8; 4],
    /// Child index this key was derived at.
    pub child_number: u32,
    /// Chain code.
    pub chain_code: [u8; 32],
    /// The embedded key.
    pub key: ExtendedKeyMaterial,
}

impl ExtendedKey {
    /// Derive a master extended private key from a seed.
    ///
    /// # Arguments
    /// * `seed` - Seed bytes, 16 to 64 bytes long.
    ///
    /// # Returns
    /// `Ok(ExtendedKey)` with mainnet private version bytes, or an error for
    /// a seed of invalid length or an unusable derived scalar.
    pub fn from_seed(seed: &[u8]) -> Result<Self, PrimitivesError> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(PrimitivesError::InvalidExtendedKey(format!(
                "seed must be between 16 and 64 bytes, got {}",
                seed.len()
            )));
        }
        let mut digest = sha512_hmac(MASTER_HMAC_KEY, seed);
        let private_key = PrivateKey::from_bytes(&digest[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&digest[32..]);
        digest.zeroize();
        let private_key = private_key?;
        Ok(ExtendedKey {
            version: MAINNET_PRIVATE,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            key: ExtendedKeyMaterial::Private(private_key),
        })
    }

    /// Parse a Base58Check extended key string.
    ///
    /// # Arguments
    /// * `s` - An `xprv`, `xpub`, `tprv` or `tpub` string.
    ///
    /// # Returns
    /// `Ok(ExtendedKey)` on success, or an error for a bad checksum, unknown
    /// version, wrong length, or invalid embedded key.
    pub fn from_string(s: &str) -> Result<Self, PrimitivesError> {
        let payload = zeroize::Zeroizing::new(base58::check_decode(s)?);
        if payload.len() != EXTENDED_KEY_LEN {
            return Err(PrimitivesError::InvalidExtendedKey(format!(
                "expected {} bytes, got {}",
                EXTENDED_KEY_LEN,
                payload.len()
            )));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&payload[0..4]);
        let depth = payload[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let child_number = u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);
        let key_bytes = &payload[45..78];

        let key = match version {
            MAINNET_PRIVATE | TESTNET_PRIVATE => {
                if key_bytes[0] != 0x00 {
                    return Err(PrimitivesError::InvalidExtendedKey(
                        "private key must be prefixed with 0x00".to_string(),
                    ));
                }
                ExtendedKeyMaterial::Private(PrivateKey::from_bytes(&key_bytes[1..])?)
            }
            MAINNET_PUBLIC | TESTNET_PUBLIC => {
                ExtendedKeyMaterial::Public(PublicKey::from_bytes(key_bytes)?)
            }
            other => {
                return Err(PrimitivesError::InvalidExtendedKey(format!(
                    "unknown version bytes {}",
                    hex::encode(other)
                )));
            }
        };

        Ok(ExtendedKey {
            version,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            key,
        })
    }

    /// Serialize back to the Base58Check string form.
    pub fn to_string_encoded(&self) -> String {
        let mut payload = Vec::with_capacity(EXTENDED_KEY_LEN);
        payload.extend_from_slice(&self.version);
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.child_number.to_be_bytes());
        payload.extend_from_slice(&self.chain_code);
        match &self.key {
            ExtendedKeyMaterial::Private(k) => {
                payload.push(0x00);
                payload.extend_from_slice(&k.to_bytes());
            }
            ExtendedKeyMaterial::Public(k) => payload.extend_from_slice(&k.to_compressed()),
        }
        base58::check_encode(&payload)
    }

    /// Whether this key carries private material.
    pub fn is_private(&self) -> bool {
        matches!(self.key, ExtendedKeyMaterial::Private(_))
    }

    /// The embedded private key, if any.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match &self.key {
            ExtendedKeyMaterial::Private(k) => Some(k),
            ExtendedKeyMaterial::Public(_) => None,
        }
    }

    /// The embedded public key (derived for private extended keys).
    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            ExtendedKeyMaterial::Private(k) => k.pub_key(),
            ExtendedKeyMaterial::Public(k) => k.clone(),
        }
    }

    /// Return the public counterpart of this key.
    ///
    /// Version bytes switch to the matching public network; everything else
    /// is preserved.
    pub fn neuter(&self) -> ExtendedKey {
        let version = match self.version {
            MAINNET_PRIVATE => MAINNET_PUBLIC,
            TESTNET_PRIVATE => TESTNET_PUBLIC,
            v => v,
        };
        ExtendedKey {
            version,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            key: ExtendedKeyMaterial::Public(self.public_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XPRV: &str = "xprv9s21ZrQH143K3p1FEwoGy1wtkUpVFRDH8iTF9gb9T3X9M4LVZk47DvwMsxopVMfCccdZapDYtTiGHxz78m82ysnDjrm48hcQ8erREmKA4xz";
    const XPUB: &str = "xpub661MyMwAqRbcGJ5iLyLHL9tdJWeyesw8VwNqx4zm1P48Drfe7HNMmjFqjF1NfJkYNN5EaRjvfWEfCZCfN4w39hX7LfpHFwc8bHA6WRiK1aH";
    const RAW_PRV: &str = "07e998012c1137decdf3efbbb1c3ee6d79b015638cbc197bdbcce1875de4faad";
    const RAW_PUB: &str = "02a1d59c993d7dcb91febde94fd3327f874c995a154dca4f7244e04724fb4c30c3";

    #[test]
    fn test_xprv_embeds_raw_private_key() {
        let key = ExtendedKey::from_string(XPRV).unwrap();
        assert!(key.is_private());
        assert_eq!(key.depth, 0);
        assert_eq!(key.private_key().unwrap().to_hex(), RAW_PRV);
        assert_eq!(key.public_key().to_hex(), RAW_PUB);
        assert_eq!(key.to_string_encoded(), XPRV);
    }

    #[test]
    fn test_xpub_embeds_public_key() {
        let key = ExtendedKey::from_string(XPUB).unwrap();
        assert!(!key.is_private());
        assert!(key.private_key().is_none());
        assert_eq!(key.public_key().to_hex(), RAW_PUB);
        assert_eq!(key.to_string_encoded(), XPUB);
    }

    #[test]
    fn test_neuter_matches_xpub() {
        let key = ExtendedKey::from_string(XPRV).unwrap();
        assert_eq!(key.neuter().to_string_encoded(), XPUB);
    }

    #[test]
    fn test_invalid_strings_are_rejected() {
        assert!(ExtendedKey::from_string("").is_err());
        assert!(ExtendedKey::from_string(RAW_PRV).is_err());
        let truncated = &XPRV[..XPRV.len() - 1];
        assert!(ExtendedKey::from_string(truncated).is_err());
    }

    #[test]
    fn test_from_seed_is_deterministic() {
        let seed = [7u8; 32];
        let a = ExtendedKey::from_seed(&seed).unwrap();
        let b = ExtendedKey::from_seed(&seed).unwrap();
        assert_eq!(a, b);
        assert!(a.to_string_encoded().starts_with("xprv"));
        assert!(ExtendedKey::from_seed(&[1u8; 8]).is_err());
    }
}
