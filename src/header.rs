//! Trie file header.
//!
//! Every serialized trie starts with a fixed 16-byte header:
//!
//! ```text
//! [magic: "TR13\n"  5 bytes]   human readable, for eyeballing and file type detection
//! [version: 1 byte]            0x90: version 1.0, 0x80 bit forces "binary" for file(1)
//! [value type: 1 byte]         1 = VInt values, 2 = byte array values
//! [reserved: 1 byte]
//! [payload length: 8 bytes]    big-endian
//! ```
//!
//! The root node's serialization follows immediately.

use crate::error::{Error, Result};
use std::io::{Read, Write};

/// Header size in bytes (fixed)
pub const HEADER_LENGTH: usize = 16;

/// Signature plus version byte
const HEADER_SIGNATURE: [u8; 6] = *b"TR13\n\x90";

/// Value types a trie can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueType {
    /// Unsigned 64-bit integers stored as VInts.
    VInt = 1,
    /// Raw byte arrays.
    Bytes = 2,
}

impl ValueType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ValueType::VInt),
            2 => Some(ValueType::Bytes),
            _ => None,
        }
    }
}

/// Decoded trie header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieHeader {
    value_type: ValueType,
    payload_length: u64,
}

impl TrieHeader {
    /// Create a new TrieHeader
    pub fn new(value_type: ValueType, payload_length: u64) -> Self {
        Self { value_type, payload_length }
    }

    /// Write a header for a payload of `payload_length` bytes into the first
    /// [`HEADER_LENGTH`] bytes of `buf`, returning the header length.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`HEADER_LENGTH`].
    pub fn fill_header_info(buf: &mut [u8], value_type: ValueType, payload_length: u64) -> usize {
        buf[..6].copy_from_slice(&HEADER_SIGNATURE);
        buf[6] = value_type as u8;
        buf[7] = 0;
        buf[8..16].copy_from_slice(&payload_length.to_be_bytes());
        HEADER_LENGTH
    }

    /// Parse and validate the header at `offset` in `buf`.
    pub fn read(buf: &[u8], offset: usize) -> Result<Self> {
        let data = offset
            .checked_add(HEADER_LENGTH)
            .and_then(|end| buf.get(offset..end))
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "Input too short for trie header: need {} bytes",
                    HEADER_LENGTH
                ))
            })?;

        if data[..6] != HEADER_SIGNATURE {
            return Err(Error::invalid_format(
                "Malformed input: no valid trie header found (signature mismatch)",
            ));
        }

        let value_type = ValueType::from_u8(data[6])
            .ok_or_else(|| Error::invalid_format(format!("Unrecognized value type: {}", data[6])))?;

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&data[8..16]);
        let payload_length = u64::from_be_bytes(len_bytes);

        Ok(Self { value_type, payload_length })
    }

    /// Encode the header to bytes
    pub fn encode(&self) -> [u8; HEADER_LENGTH] {
        let mut buf = [0u8; HEADER_LENGTH];
        Self::fill_header_info(&mut buf, self.value_type, self.payload_length);
        buf
    }

    /// Write the header to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Read the header from a reader
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_LENGTH];
        reader.read_exact(&mut buf)?;
        Self::read(&buf, 0)
    }

    /// Type of values stored in the trie
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Length of the root node's serialization
    pub fn payload_length(&self) -> u64 {
        self.payload_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layout() {
        let mut buf = [0xFFu8; 20];
        let len = TrieHeader::fill_header_info(&mut buf, ValueType::Bytes, 0x0102_0304_0506_0708);
        assert_eq!(len, HEADER_LENGTH);
        assert_eq!(&buf[..5], b"TR13\n");
        assert_eq!(buf[5], 0x90);
        assert_eq!(buf[6], 2);
        assert_eq!(buf[7], 0);
        assert_eq!(&buf[8..16], &[1, 2, 3, 4, 5, 6, 7, 8]);
        // Nothing past the header is touched
        assert_eq!(buf[16], 0xFF);
    }

    #[test]
    fn test_header_encode_read() {
        let header = TrieHeader::new(ValueType::VInt, 12_345);
        let encoded = header.encode();

        let decoded = TrieHeader::read(&encoded, 0).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.value_type(), ValueType::VInt);
        assert_eq!(decoded.payload_length(), 12_345);
    }

    #[test]
    fn test_header_read_at_offset() {
        let mut buf = vec![0u8; 3];
        buf.extend_from_slice(&TrieHeader::new(ValueType::Bytes, 7).encode());
        let decoded = TrieHeader::read(&buf, 3).unwrap();
        assert_eq!(decoded.payload_length(), 7);
    }

    #[test]
    fn test_header_invalid_signature() {
        let mut encoded = TrieHeader::new(ValueType::VInt, 1).encode();
        encoded[0] = b'X';
        assert!(matches!(TrieHeader::read(&encoded, 0), Err(Error::InvalidFormat(_))));

        let mut encoded = TrieHeader::new(ValueType::VInt, 1).encode();
        encoded[5] = 0x91;
        assert!(matches!(TrieHeader::read(&encoded, 0), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_header_unknown_value_type() {
        let mut encoded = TrieHeader::new(ValueType::VInt, 1).encode();
        encoded[6] = 9;
        let err = TrieHeader::read(&encoded, 0).unwrap_err();
        assert!(err.to_string().contains("value type"));
    }

    #[test]
    fn test_header_too_short() {
        assert!(matches!(TrieHeader::read(&[0u8; 10], 0), Err(Error::InvalidFormat(_))));
        assert!(matches!(TrieHeader::read(&[0u8; 16], usize::MAX), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_header_write_read() {
        let header = TrieHeader::new(ValueType::Bytes, 99);

        let mut buffer = Vec::new();
        header.write_to(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer);
        assert_eq!(TrieHeader::read_from(&mut cursor).unwrap(), header);
    }
}
