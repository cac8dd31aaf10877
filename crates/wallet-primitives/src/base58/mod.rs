//! Base58 and Base58Check codecs.
//!
//! Extended keys (`xprv`/`xpub`) travel as Base58Check strings: the payload
//! followed by the first four bytes of its double SHA-256.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum suffix.
const CHECKSUM_LEN: usize = 4;

/// Encode bytes with the Bitcoin Base58 alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string with the Bitcoin alphabet.
///
/// # Returns
/// The decoded bytes, or `InvalidBase58` for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `data` followed by its 4-byte SHA-256d checksum.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&payload)
}

/// Decode a Base58Check string and strip the verified checksum.
///
/// # Arguments
/// * `s` - The Base58Check string.
///
/// # Returns
/// The payload without its checksum, `ChecksumMismatch` when the trailing
/// four bytes disagree, or `InvalidBase58` for malformed input.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum != &sha256d(payload)[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_bytes_become_ones() {
        let input = hex::decode("000000287FB4CD").unwrap();
        assert_eq!(encode(&input), "111233QC4");
        assert_eq!(decode("111233QC4").unwrap(), input);
    }

    #[test]
    fn test_decode_rejects_characters_outside_alphabet() {
        assert!(decode("0OIl").is_err());
        assert!(decode("abc!").is_err());
    }

    #[test]
    fn test_check_decode_extended_key_payload() {
        let xpub = "xpub661MyMwAqRbcGJ5iLyLHL9tdJWeyesw8VwNqx4zm1P48Drfe7HNMmjFqjF1NfJkYNN5EaRjvfWEfCZCfN4w39hX7LfpHFwc8bHA6WRiK1aH";
        let payload = check_decode(xpub).unwrap();
        assert_eq!(payload.len(), 78);
        assert_eq!(&payload[..4], &[0x04, 0x88, 0xb2, 0x1e]);
        assert_eq!(check_encode(&payload), xpub);
    }

    #[test]
    fn test_check_decode_rejects_tampered_checksum() {
        let mut encoded = check_encode(&[0x04, 0x88, 0xad, 0xe4, 0x00]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(check_decode(&encoded).is_err());
    }
}
