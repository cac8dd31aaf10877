//! Casper's little-endian binary encoding, as far as deploy hashing needs it.
//!
//! Sequences and strings carry a `u32` length prefix. Big unsigned integers
//! (`U128`, `U256`, `U512`) carry a one-byte length followed by the minimal
//! little-endian magnitude, so zero is the single byte `00`.

use num_bigint::BigUint;
use num_traits::Zero;
use wallet_core::BuilderError;
use wallet_primitives::util::{ByteReader, ByteWriter};

/// Write a `u32`-length-prefixed byte string.
pub fn write_prefixed_bytes(writer: &mut ByteWriter, bytes: &[u8]) -> Result<(), BuilderError> {
    writer.write_u32_le(length_u32(bytes.len())?);
    writer.write_bytes(bytes);
    Ok(())
}

/// Write a `u32`-length-prefixed UTF-8 string.
pub fn write_string(writer: &mut ByteWriter, value: &str) -> Result<(), BuilderError> {
    write_prefixed_bytes(writer, value.as_bytes())
}

/// Write a big unsigned integer whose magnitude fits in `max_bytes`.
pub fn write_biguint(
    writer: &mut ByteWriter,
    value: &BigUint,
    max_bytes: usize,
) -> Result<(), BuilderError> {
    if value.is_zero() {
        writer.write_u8(0);
        return Ok(());
    }
    let bytes = value.to_bytes_le();
    if bytes.len() > max_bytes {
        return Err(BuilderError::InvalidParameterValue(format!(
            "value {} does not fit in {} bytes",
            value, max_bytes
        )));
    }
    writer.write_u8(bytes.len() as u8);
    writer.write_bytes(&bytes);
    Ok(())
}

/// Read a `u32`-length-prefixed byte string.
pub fn read_prefixed_bytes(reader: &mut ByteReader<'_>) -> Result<Vec<u8>, BuilderError> {
    let len = reader.read_u32_le()? as usize;
    Ok(reader.read_bytes(len)?.to_vec())
}

/// Read a `u32`-length-prefixed UTF-8 string.
pub fn read_string(reader: &mut ByteReader<'_>) -> Result<String, BuilderError> {
    let bytes = read_prefixed_bytes(reader)?;
    String::from_utf8(bytes).map_err(|e| BuilderError::Parse(format!("invalid utf-8 string: {}", e)))
}

/// Read a big unsigned integer of at most `max_bytes` magnitude bytes.
pub fn read_biguint(reader: &mut ByteReader<'_>, max_bytes: usize) -> Result<BigUint, BuilderError> {
    let len = reader.read_u8()? as usize;
    if len > max_bytes {
        return Err(BuilderError::Parse(format!(
            "integer length {} exceeds {} bytes",
            len, max_bytes
        )));
    }
    Ok(BigUint::from_bytes_le(reader.read_bytes(len)?))
}

/// Convert a length to the `u32` prefix used on the wire.
pub fn length_u32(len: usize) -> Result<u32, BuilderError> {
    u32::try_from(len)
        .map_err(|_| BuilderError::InvalidParameterValue(format!("length {} exceeds u32", len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_biguint(value: u64) -> Vec<u8> {
        let mut w = ByteWriter::new();
        write_biguint(&mut w, &BigUint::from(value), 64).unwrap();
        w.into_bytes()
    }

    #[test]
    fn test_biguint_encoding() {
        assert_eq!(encode_biguint(0), vec![0x00]);
        assert_eq!(encode_biguint(1), vec![0x01, 0x01]);
        assert_eq!(encode_biguint(256), vec![0x02, 0x00, 0x01]);
        // 2_500_000_000 motes
        assert_eq!(encode_biguint(2_500_000_000), vec![0x04, 0x00, 0xf9, 0x02, 0x95]);
    }

    #[test]
    fn test_biguint_rejects_oversized_values() {
        let mut w = ByteWriter::new();
        let too_big = BigUint::from(1u8) << 128;
        assert!(write_biguint(&mut w, &too_big, 16).is_err());

        let mut r = ByteReader::new(&[17u8]);
        assert!(read_biguint(&mut r, 16).is_err());
    }

    #[test]
    fn test_biguint_read_back() {
        let bytes = encode_biguint(2_500_000_000);
        let mut r = ByteReader::new(&bytes);
        assert_eq!(read_biguint(&mut r, 64).unwrap(), BigUint::from(2_500_000_000u64));
        assert!(r.is_empty());
    }

    #[test]
    fn test_string_encoding() {
        let mut w = ByteWriter::new();
        write_string(&mut w, "casper").unwrap();
        assert_eq!(hex::encode(w.as_bytes()), "06000000636173706572");
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(read_string(&mut r).unwrap(), "casper");
    }

    #[test]
    fn test_read_string_rejects_invalid_utf8() {
        let bytes = [2, 0, 0, 0, 0xff, 0xfe];
        let mut r = ByteReader::new(&bytes);
        assert!(read_string(&mut r).is_err());
    }
}
