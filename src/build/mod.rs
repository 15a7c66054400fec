//! Building tries from sorted key/value input.
//!
//! Input flows from a [`KeyValueSource`] into a [`TrieBuilder`], which keeps
//! only the path of the most recent key open. Everything to the left of that
//! path is already closed (and, below the serialization threshold, already
//! flattened to bytes), so memory use tracks the size of the output rather
//! than the number of keys.

pub mod builder;
pub mod open;
pub mod source;

pub use builder::{write_trie, BuildStats, TrieBuilder};
pub use open::OpenNode;
pub use source::{DelimitedSource, KeyValueSource, PairSource, DEFAULT_SEPARATOR};
