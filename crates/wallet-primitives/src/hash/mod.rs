//! Digests.
//!
//! BLAKE2b-256 is the content hash behind deploy hashes and account hashes.
//! SHA-256 is what secp256k1 approvals sign over, SHA-256d guards Base58Check
//! strings and HMAC-SHA512 seeds BIP32 master keys.

use blake2::digest::consts::U32;
use blake2::Blake2b;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type Blake2b256 = Blake2b<U32>;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// `sha256(sha256(data))`.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// HMAC-SHA512 keyed with `key`.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    // HMAC pads or hashes the key, so every length is accepted.
    let mut mac = <Hmac<Sha512> as Mac>::new_from_slice(key).expect("hmac key of any length");
    mac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// BLAKE2b with a 32-byte output, unkeyed.
///
/// # Arguments
/// * `data` - Bytes to hash.
///
/// # Returns
/// The digest as a fixed array, ready to hex-encode.
pub fn blake2b256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    // RFC 4231 test cases 1 and 2
    #[test]
    fn test_sha512_hmac_rfc4231() {
        let mac = sha512_hmac(&[0x0b; 20], b"Hi There");
        assert_eq!(
            hex::encode(mac),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
        let mac = sha512_hmac(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_blake2b256_known_vectors() {
        assert_eq!(
            hex::encode(blake2b256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
        assert_eq!(
            hex::encode(blake2b256(b"abc")),
            "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319"
        );
    }
}
