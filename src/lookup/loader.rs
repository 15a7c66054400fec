//! Loading serialized tries (header + payload) into lookup engines.
//!
//! Every loader validates the header before any traversal can happen: the
//! signature and value type must be recognized, the value type must match the
//! codec asked for, and the declared payload must fit in the available bytes.

use crate::error::{Error, Result};
use crate::header::{TrieHeader, HEADER_LENGTH};
use crate::lookup::{ArrayTrie, BufferTrie, TrieBuffer, TrieLookup};
use crate::node::ValueCodec;
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Check the header against the codec and the number of bytes actually
/// available after it; returns the payload length.
fn validate_header<C: ValueCodec>(header: &TrieHeader, available: u64) -> Result<usize> {
    if header.value_type() != C::VALUE_TYPE {
        return Err(Error::invalid_argument(format!(
            "Trie holds {:?} values, but {:?} values were requested",
            header.value_type(),
            C::VALUE_TYPE
        )));
    }
    let declared = header.payload_length();
    if declared > available {
        return Err(Error::invalid_format(format!(
            "Declared payload of {} bytes exceeds the {} bytes available",
            declared, available
        )));
    }
    let len = usize::try_from(declared).map_err(|_| {
        Error::invalid_format(format!("Payload of {} bytes is not addressable", declared))
    })?;
    log::debug!("Trie header: {:?} values, payload {} bytes", header.value_type(), len);
    Ok(len)
}

/// Load a trie from `data` (header followed by payload), copying the payload
/// into a heap array.
pub fn load_trie<C: ValueCodec>(data: &[u8]) -> Result<ArrayTrie<C>> {
    let header = TrieHeader::read(data, 0)?;
    let len = validate_header::<C>(&header, (data.len() - HEADER_LENGTH) as u64)?;
    Ok(TrieLookup::new(data[HEADER_LENGTH..HEADER_LENGTH + len].to_vec()))
}

/// Load a trie from a shared buffer without copying: the lookup keeps a
/// reference-counted slice of `data`.
pub fn load_trie_buffer<C: ValueCodec>(data: Bytes) -> Result<BufferTrie<C>> {
    let header = TrieHeader::read(&data, 0)?;
    let len = validate_header::<C>(&header, (data.len() - HEADER_LENGTH) as u64)?;
    Ok(TrieLookup::new(data.slice(HEADER_LENGTH..HEADER_LENGTH + len)))
}

/// Read a trie from a stream.
///
/// The stream must hold at least the declared payload; a short stream is
/// reported as an I/O error.
pub fn read_trie<C: ValueCodec, R: Read>(reader: &mut R) -> Result<ArrayTrie<C>> {
    let header = TrieHeader::read_from(reader)?;
    let len = validate_header::<C>(&header, usize::MAX as u64)?;

    let mut payload = Vec::new();
    reader.take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("Unexpected end of stream: read {} of {} payload bytes", payload.len(), len),
        )));
    }
    Ok(TrieLookup::new(payload))
}

/// Read a trie file into memory.
pub fn open_trie<C: ValueCodec, P: AsRef<Path>>(path: P) -> Result<ArrayTrie<C>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    if file_size < HEADER_LENGTH as u64 {
        return Err(Error::invalid_format("File too small to be a valid trie"));
    }

    let mut reader = BufReader::new(file);
    let header = TrieHeader::read_from(&mut reader)?;
    validate_header::<C>(&header, file_size - HEADER_LENGTH as u64)?;
    log::info!("Loading trie from {:?}", path);

    let mut payload = vec![0u8; header.payload_length() as usize];
    reader.read_exact(&mut payload)?;
    Ok(TrieLookup::new(payload))
}

/// Payload region of a memory-mapped trie file.
#[cfg(feature = "mmap")]
#[derive(Debug)]
pub struct MappedRegion {
    map: memmap2::Mmap,
    len: usize,
}

#[cfg(feature = "mmap")]
impl TrieBuffer for MappedRegion {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        if offset < self.len {
            self.map.get(HEADER_LENGTH + offset).copied()
        } else {
            None
        }
    }

    #[inline]
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.len {
            return None;
        }
        self.map.get(HEADER_LENGTH + offset..HEADER_LENGTH + end)
    }
}

/// Memory-map a trie file and look keys up directly in the mapping.
///
/// The file must not be modified while the lookup is alive.
#[cfg(feature = "mmap")]
pub fn open_mapped_trie<C: ValueCodec, P: AsRef<Path>>(path: P) -> Result<crate::lookup::MappedTrie<C>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    // SAFETY: trie files are written once and never modified in place
    let map = unsafe { memmap2::Mmap::map(&file) }?;

    let header = TrieHeader::read(&map, 0)?;
    let len = validate_header::<C>(&header, (map.len() - HEADER_LENGTH) as u64)?;
    log::info!("Mapped trie {:?}: {} payload bytes", path, len);

    Ok(TrieLookup::new(MappedRegion { map, len }))
}
