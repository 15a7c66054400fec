//! # tr13 - Compact Immutable Tries
//!
//! tr13 builds read-only tries from sorted key/value input and serializes
//! them into a dense byte format that can be searched in place, without
//! deserializing and without allocating per lookup.
//!
//! ## Architecture
//!
//! - **VInt codec**: variable-length unsigned integers whose leading byte can
//!   give up its top bits to a node type tag
//! - **Node model**: closed (immutable) leaves and branches, built by a node
//!   factory for one value type
//! - **Builder**: streams sorted input, keeping only the path of the latest
//!   key open and flattening small subtrees to bytes as soon as they close
//! - **Header**: 16-byte file header naming the value type and payload length
//! - **Lookup**: traversal over heap arrays, shared `Bytes` buffers or
//!   memory-mapped files
//!
//! Two value types are supported: unsigned 64-bit integers
//! ([`VIntValues`]) and byte arrays ([`BytesValues`]).
//!
//! ## Example Usage
//!
//! ```rust
//! use tr13::{load_trie, write_trie, BuildOptions, TrieBuilder, VIntValues};
//!
//! # fn main() -> Result<(), tr13::Error> {
//! let mut builder = TrieBuilder::<VIntValues>::new(BuildOptions::default())?;
//! builder.add(b"ab", 10)?;
//! builder.add(b"abc", 20)?;
//! builder.add(b"foo", 5)?;
//! let root = builder.finish()?;
//!
//! // Header + payload, as it would be stored in a file
//! let mut file = Vec::new();
//! write_trie(&root, &mut file, true)?;
//!
//! let trie = load_trie::<VIntValues>(&file)?;
//! assert_eq!(trie.find_value(b"abc")?, Some(20));
//! assert_eq!(trie.find_value(b"fo")?, None);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod build;
pub mod config;
pub mod error;
pub mod header;
pub mod lookup;
pub mod node;
pub mod vint;

// Re-exports
pub use build::{write_trie, BuildStats, DelimitedSource, KeyValueSource, PairSource, TrieBuilder};
pub use config::{BuildOptions, DuplicatePolicy};
pub use error::{Error, Result};
pub use header::{TrieHeader, ValueType, HEADER_LENGTH};
pub use lookup::{load_trie, load_trie_buffer, open_trie, read_trie, ArrayTrie, BufferTrie, TrieBuffer, TrieLookup};
#[cfg(feature = "mmap")]
pub use lookup::{open_mapped_trie, MappedTrie};
pub use node::{BytesValues, ClosedNode, NodeFactory, VIntValues, ValueCodec};

/// Build a trie from `pairs` (sorted by key) with default options and return
/// its serialized payload, without a header.
///
/// # Example
///
/// ```rust
/// use tr13::{build_trie, ArrayTrie, BytesValues, TrieLookup};
///
/// let payload = build_trie::<BytesValues, _, _>(vec![("k", b"v".to_vec())]).unwrap();
/// let trie: ArrayTrie<BytesValues> = TrieLookup::new(payload);
/// assert_eq!(trie.find_value(b"k").unwrap(), Some(&b"v"[..]));
/// ```
pub fn build_trie<C, K, I>(pairs: I) -> Result<Vec<u8>>
where
    C: ValueCodec,
    K: AsRef<[u8]>,
    I: IntoIterator<Item = (K, C::Value)>,
{
    let mut source = PairSource::new(pairs);
    let root = TrieBuilder::<C>::new(BuildOptions::default())?.build(&mut source)?;
    Ok(root.serialize())
}
