//! Lookups over serialized tries.
//!
//! The engine in [`engine`] walks the raw node bytes directly; it only needs
//! a way to read single bytes and byte regions at given offsets. That
//! capability is the [`TrieBuffer`] trait, implemented here for heap arrays,
//! shared `bytes::Bytes` buffers and (with the `mmap` feature) memory-mapped
//! files. All backends answer identically for the same bytes.

pub mod engine;
pub mod loader;

pub use engine::TrieLookup;
pub use loader::{load_trie, load_trie_buffer, open_trie, read_trie};
#[cfg(feature = "mmap")]
pub use loader::{open_mapped_trie, MappedRegion};

use bytes::Bytes;
use std::sync::Arc;

/// Read access to the serialized payload of a trie.
///
/// Offsets are relative to the start of the root node. Both methods return
/// `None` for anything outside the payload; they must never panic.
pub trait TrieBuffer {
    /// Payload length in bytes.
    fn len(&self) -> usize;

    /// Whether the payload is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The byte at `offset`.
    fn byte_at(&self, offset: usize) -> Option<u8>;

    /// `len` bytes starting at `offset`.
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

impl TrieBuffer for [u8] {
    #[inline]
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }

    #[inline]
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.get(offset..offset.checked_add(len)?)
    }
}

impl TrieBuffer for Vec<u8> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_slice().byte_at(offset)
    }

    #[inline]
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.as_slice().region(offset, len)
    }
}

impl TrieBuffer for Arc<[u8]> {
    #[inline]
    fn len(&self) -> usize {
        self.as_ref().len()
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_ref().byte_at(offset)
    }

    #[inline]
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.as_ref().region(offset, len)
    }
}

impl TrieBuffer for Bytes {
    #[inline]
    fn len(&self) -> usize {
        Bytes::len(self)
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_ref().byte_at(offset)
    }

    #[inline]
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.as_ref().region(offset, len)
    }
}

impl<T: TrieBuffer + ?Sized> TrieBuffer for &T {
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        (**self).byte_at(offset)
    }

    #[inline]
    fn region(&self, offset: usize, len: usize) -> Option<&[u8]> {
        (**self).region(offset, len)
    }
}

/// Lookup over a heap-allocated byte array.
pub type ArrayTrie<C> = TrieLookup<Vec<u8>, C>;

/// Lookup over a shared, reference-counted buffer.
pub type BufferTrie<C> = TrieLookup<Bytes, C>;

/// Lookup over a memory-mapped trie file.
#[cfg(feature = "mmap")]
pub type MappedTrie<C> = TrieLookup<MappedRegion, C>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_buffer_bounds() {
        let data: &[u8] = &[1, 2, 3, 4];
        assert_eq!(TrieBuffer::len(data), 4);
        assert_eq!(data.byte_at(3), Some(4));
        assert_eq!(data.byte_at(4), None);
        assert_eq!(data.region(1, 3), Some(&[2u8, 3, 4][..]));
        assert_eq!(data.region(2, 3), None);
        assert_eq!(data.region(usize::MAX, 2), None);
    }

    #[test]
    fn test_backends_agree() {
        let raw = vec![9u8, 8, 7, 6, 5];
        let bytes = Bytes::from(raw.clone());
        let shared: Arc<[u8]> = Arc::from(raw.clone());

        for offset in 0..7 {
            assert_eq!(raw.byte_at(offset), bytes.byte_at(offset));
            assert_eq!(raw.byte_at(offset), shared.byte_at(offset));
            assert_eq!(raw.region(offset, 2), bytes.region(offset, 2));
            assert_eq!(raw.region(offset, 2), shared.region(offset, 2));
        }
    }

    #[test]
    fn test_bytes_slice_is_offset() {
        let whole = Bytes::from_static(b"headerPAYLOAD");
        let payload = whole.slice(6..);
        assert_eq!(TrieBuffer::len(&payload), 7);
        assert_eq!(payload.byte_at(0), Some(b'P'));
    }
}
