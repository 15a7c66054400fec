//! Traversal of serialized tries.
//!
//! A lookup is a small state machine over a cursor into the node bytes and a
//! cursor into the unconsumed tail of the key. The top two bits of the byte
//! under the node cursor select the state:
//!
//! - Simple Leaf: match iff the key is used up.
//! - Leaf-with-Suffix: match iff the rest of the key equals the suffix.
//! - Simple Branch: scan `(byte, child)` entries for the next key byte.
//! - Branch-with-Value: match at key end, otherwise scan like a simple branch.
//!
//! Mismatching entries are skipped by reading only the child's header fields,
//! so a scan never descends into siblings.

use crate::error::{Error, Result};
use crate::lookup::TrieBuffer;
use crate::node::{
    NodeType, ValueCodec, FIRST_BYTE_BITS_FOR_BRANCHES, FIRST_BYTE_BITS_FOR_LEAVES, FULL_BYTE_BITS,
};
use crate::vint;
use std::fmt;
use std::marker::PhantomData;

/// Read-only lookup engine over the serialized payload of a trie.
///
/// The engine holds no mutable state, so it can be shared freely between
/// threads whenever its buffer can.
///
/// Usage:
/// ```
/// use tr13::build::TrieBuilder;
/// use tr13::lookup::TrieLookup;
/// use tr13::node::VIntValues;
/// use tr13::BuildOptions;
///
/// let mut builder = TrieBuilder::<VIntValues>::new(BuildOptions::default()).unwrap();
/// builder.add(b"apple", 1).unwrap();
/// builder.add(b"apricot", 2).unwrap();
/// let payload = builder.finish().unwrap().serialize();
///
/// let trie = TrieLookup::<_, VIntValues>::new(payload);
/// assert_eq!(trie.find_value(b"apricot").unwrap(), Some(2));
/// assert_eq!(trie.find_value(b"ap").unwrap(), None);
/// ```
pub struct TrieLookup<B, C> {
    buffer: B,
    _codec: PhantomData<fn() -> C>,
}

impl<B: TrieBuffer, C: ValueCodec> fmt::Debug for TrieLookup<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieLookup")
            .field("payload_len", &self.buffer.len())
            .field("value_type", &C::VALUE_TYPE)
            .finish()
    }
}

impl<B: Clone, C> Clone for TrieLookup<B, C> {
    fn clone(&self) -> Self {
        Self { buffer: self.buffer.clone(), _codec: PhantomData }
    }
}

impl<B: TrieBuffer, C: ValueCodec> TrieLookup<B, C> {
    /// Wrap the serialized root node (no header) held in `buffer`.
    pub fn new(buffer: B) -> Self {
        Self { buffer, _codec: PhantomData }
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Consume the lookup, returning its buffer
    pub fn into_buffer(self) -> B {
        self.buffer
    }

    /// Length of the serialized payload
    pub fn payload_len(&self) -> usize {
        self.buffer.len()
    }

    /// Find the value stored for `key`.
    ///
    /// Returns `Ok(None)` when the key is absent, and an error only if the
    /// trie bytes turn out to be inconsistent.
    pub fn find_value(&self, key: &[u8]) -> Result<Option<C::Ref<'_>>> {
        let mut ptr = 0usize;
        let mut key_pos = 0usize;

        'node: loop {
            let lead = self.byte(ptr)?;
            let children_end = match NodeType::from_lead_byte(lead) {
                NodeType::SimpleLeaf => {
                    if key_pos != key.len() {
                        return Ok(None);
                    }
                    let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_LEAVES, ptr)?;
                    return self.value(header, next).map(Some);
                }
                NodeType::SuffixLeaf => {
                    let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_LEAVES, ptr)?;
                    let value = self.value(header, next)?;
                    let next = self.skip_payload(header, next)?;
                    let (suffix_len, next) = self.vint(FULL_BYTE_BITS, next)?;
                    let suffix = self.region(next, suffix_len)?;
                    return Ok((suffix == &key[key_pos..]).then_some(value));
                }
                NodeType::SimpleBranch => {
                    // A branch always needs at least one more key byte
                    if key_pos == key.len() {
                        return Ok(None);
                    }
                    let (content_len, next) = self.vint(FIRST_BYTE_BITS_FOR_BRANCHES, ptr)?;
                    ptr = next;
                    self.offset_after(ptr, content_len)?
                }
                NodeType::ValueBranch => {
                    let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_BRANCHES, ptr)?;
                    if key_pos == key.len() {
                        return self.value(header, next).map(Some);
                    }
                    let next = self.skip_payload(header, next)?;
                    let (content_len, next) = self.vint(FULL_BYTE_BITS, next)?;
                    ptr = next;
                    self.offset_after(ptr, content_len)?
                }
            };

            let wanted = key[key_pos];
            while ptr < children_end {
                let b = self.byte(ptr)?;
                ptr += 1;
                if b == wanted {
                    key_pos += 1;
                    continue 'node;
                }
                ptr = self.skip_entry(ptr)?;
            }
            if ptr != children_end {
                return Err(Error::corruption(format!(
                    "Child entry overruns children block: ended at {}, block ends at {}",
                    ptr, children_end
                )));
            }
            return Ok(None);
        }
    }

    /// Whether `key` has a value in the trie.
    pub fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.find_value(key)?.is_some())
    }

    /// Find the value for `key`, falling back to `default` when absent.
    pub fn get_value_or<'a>(&'a self, key: &[u8], default: C::Ref<'a>) -> Result<C::Ref<'a>> {
        Ok(self.find_value(key)?.unwrap_or(default))
    }

    /// Visit every key and value in storage order.
    ///
    /// Keys are visited depth first; within a branch, children come in the
    /// order they were written (ascending unless the trie was built with
    /// child reordering). The whole payload must be consumed exactly.
    pub fn for_each_entry<'a, F>(&'a self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], C::Ref<'a>),
    {
        let mut key = Vec::new();
        let end = self.walk(0, &mut key, &mut visit)?;
        if end != self.buffer.len() {
            return Err(Error::corruption(format!(
                "Root node ends at {}, payload is {} bytes",
                end,
                self.buffer.len()
            )));
        }
        Ok(())
    }

    /// Collect all entries as owned pairs, in storage order.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, C::Value)>> {
        let mut entries = Vec::new();
        self.for_each_entry(|key, value| entries.push((key.to_vec(), C::to_owned_value(value))))?;
        Ok(entries)
    }

    /// Number of keys stored in the trie (walks the whole payload).
    pub fn entry_count(&self) -> Result<u64> {
        let mut count = 0u64;
        self.for_each_entry(|_, _| count += 1)?;
        Ok(count)
    }

    fn walk<'a, F>(&'a self, ptr: usize, key: &mut Vec<u8>, visit: &mut F) -> Result<usize>
    where
        F: FnMut(&[u8], C::Ref<'a>),
    {
        let lead = self.byte(ptr)?;
        let (mut ptr, children_end) = match NodeType::from_lead_byte(lead) {
            NodeType::SimpleLeaf => {
                let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_LEAVES, ptr)?;
                visit(key.as_slice(), self.value(header, next)?);
                return self.skip_payload(header, next);
            }
            NodeType::SuffixLeaf => {
                let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_LEAVES, ptr)?;
                let value = self.value(header, next)?;
                let next = self.skip_payload(header, next)?;
                let (suffix_len, next) = self.vint(FULL_BYTE_BITS, next)?;
                let suffix = self.region(next, suffix_len)?;
                let base = key.len();
                key.extend_from_slice(suffix);
                visit(key.as_slice(), value);
                key.truncate(base);
                return Ok(next + suffix.len());
            }
            NodeType::SimpleBranch => {
                let (content_len, next) = self.vint(FIRST_BYTE_BITS_FOR_BRANCHES, ptr)?;
                (next, self.offset_after(next, content_len)?)
            }
            NodeType::ValueBranch => {
                let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_BRANCHES, ptr)?;
                visit(key.as_slice(), self.value(header, next)?);
                let next = self.skip_payload(header, next)?;
                let (content_len, next) = self.vint(FULL_BYTE_BITS, next)?;
                (next, self.offset_after(next, content_len)?)
            }
        };

        while ptr < children_end {
            key.push(self.byte(ptr)?);
            ptr = self.walk(ptr + 1, key, visit)?;
            key.pop();
        }
        if ptr != children_end {
            return Err(Error::corruption(format!(
                "Child entry overruns children block: ended at {}, block ends at {}",
                ptr, children_end
            )));
        }
        Ok(ptr)
    }

    /// Offset just past the entry whose node starts at `ptr`, reading only
    /// the node's header fields.
    fn skip_entry(&self, ptr: usize) -> Result<usize> {
        match NodeType::from_lead_byte(self.byte(ptr)?) {
            NodeType::SimpleLeaf => {
                let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_LEAVES, ptr)?;
                self.skip_payload(header, next)
            }
            NodeType::SuffixLeaf => {
                let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_LEAVES, ptr)?;
                let next = self.skip_payload(header, next)?;
                let (suffix_len, next) = self.vint(FULL_BYTE_BITS, next)?;
                self.offset_after(next, suffix_len)
            }
            NodeType::SimpleBranch => {
                let (content_len, next) = self.vint(FIRST_BYTE_BITS_FOR_BRANCHES, ptr)?;
                self.offset_after(next, content_len)
            }
            NodeType::ValueBranch => {
                let (header, next) = self.vint(FIRST_BYTE_BITS_FOR_BRANCHES, ptr)?;
                let next = self.skip_payload(header, next)?;
                let (content_len, next) = self.vint(FULL_BYTE_BITS, next)?;
                self.offset_after(next, content_len)
            }
        }
    }

    #[inline]
    fn byte(&self, ptr: usize) -> Result<u8> {
        self.buffer
            .byte_at(ptr)
            .ok_or_else(|| Error::corruption(format!("Node offset {} outside payload", ptr)))
    }

    #[inline]
    fn vint(&self, first_byte_bits: u32, ptr: usize) -> Result<(u64, usize)> {
        vint::read_unsigned_with(first_byte_bits, ptr, |p| self.buffer.byte_at(p))
            .ok_or_else(|| Error::corruption(format!("Truncated VInt at offset {}", ptr)))
    }

    #[inline]
    fn value(&self, header: u64, ptr: usize) -> Result<C::Ref<'_>> {
        C::read_value(&self.buffer, header, ptr)
            .ok_or_else(|| Error::corruption(format!("Value at offset {} exceeds payload", ptr)))
    }

    #[inline]
    fn skip_payload(&self, header: u64, ptr: usize) -> Result<usize> {
        self.offset_after(ptr, C::payload_len(header))
    }

    #[inline]
    fn region(&self, ptr: usize, len: u64) -> Result<&[u8]> {
        usize::try_from(len)
            .ok()
            .and_then(|len| self.buffer.region(ptr, len))
            .ok_or_else(|| Error::corruption(format!("Region of {} bytes at offset {} exceeds payload", len, ptr)))
    }

    /// `ptr + len`, checked against the payload bounds
    #[inline]
    fn offset_after(&self, ptr: usize, len: u64) -> Result<usize> {
        usize::try_from(len)
            .ok()
            .and_then(|len| ptr.checked_add(len))
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                Error::corruption(format!("Length {} at offset {} runs past end of payload", len, ptr))
            })
    }
}
