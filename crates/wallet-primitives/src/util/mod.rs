//! Little-endian byte cursors.
//!
//! Length-prefix rules belong to the chain codecs built on top of these.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Reads from a borrowed slice. A failed read leaves the position where it
/// was.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Take the next `n` bytes, or `UnexpectedEof` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// Append-only output buffer.
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_little_endian_layout() {
        let mut w = ByteWriter::with_capacity(13);
        w.write_u8(0x02);
        w.write_u32_le(5);
        w.write_u64_le(1_623_177_561_052);
        assert_eq!(w.len(), 13);
        assert_eq!(
            hex::encode(w.as_bytes()),
            "0205000000dc03ecec79010000"
        );
    }

    #[test]
    fn test_reader_reads_what_writer_wrote() {
        let mut w = ByteWriter::new();
        w.write_u32_le(0xdead_beef);
        w.write_u64_le(86_400_000);
        w.write_bytes(b"casper");
        let bytes = w.into_bytes();

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u32_le().unwrap(), 0xdead_beef);
        assert_eq!(r.read_u64_le().unwrap(), 86_400_000);
        assert_eq!(r.read_bytes(6).unwrap(), b"casper");
        assert!(r.is_empty());
    }

    #[test]
    fn test_reader_eof_does_not_advance() {
        let data = [1u8, 2, 3];
        let mut r = ByteReader::new(&data);
        assert!(matches!(r.read_u32_le(), Err(PrimitivesError::UnexpectedEof)));
        assert_eq!(r.remaining(), 3);
        assert_eq!(r.read_array::<3>().unwrap(), [1, 2, 3]);
        assert!(r.read_u8().is_err());
    }
}
