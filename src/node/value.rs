//! Value codecs.
//!
//! A trie's topology and traversal never look inside values; they only need to
//! know which integer goes into a node's leading VInt and how many raw bytes
//! follow it. [`ValueCodec`] captures exactly that, which lets one builder and
//! one lookup engine serve both integer-valued and byte-array-valued tries.

use crate::header::ValueType;
use crate::lookup::TrieBuffer;
use std::fmt;

/// Describes how values of one type are written into and read out of nodes.
pub trait ValueCodec {
    /// Owned value handed to the builder.
    type Value: fmt::Debug + Clone;

    /// Value as returned by lookups, borrowed from the trie bytes where
    /// possible so lookups stay allocation-free.
    type Ref<'a>: Copy + fmt::Debug;

    /// Value type tag recorded in the trie header.
    const VALUE_TYPE: ValueType;

    /// Integer stored in the node's leading VInt.
    fn header_value(value: &Self::Value) -> u64;

    /// Raw bytes written right after the leading VInt.
    fn payload(value: &Self::Value) -> &[u8];

    /// Number of payload bytes that follow a leading VInt holding `header`.
    fn payload_len(header: u64) -> u64;

    /// Reads a value whose leading VInt decoded to `header` and whose payload
    /// starts at `ptr`. Returns `None` if the payload lies outside `buf`.
    fn read_value<'a, B: TrieBuffer + ?Sized>(buf: &'a B, header: u64, ptr: usize) -> Option<Self::Ref<'a>>;

    /// Copies a borrowed value into an owned one.
    fn to_owned_value(value: Self::Ref<'_>) -> Self::Value;

    /// Serialized length of `value` given `first_byte_bits` for its VInt.
    fn value_length(value: &Self::Value, first_byte_bits: u32) -> u64 {
        crate::vint::length_for_unsigned(Self::header_value(value), first_byte_bits) as u64
            + Self::payload(value).len() as u64
    }
}

/// Integer values stored directly in the leading VInt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VIntValues;

impl ValueCodec for VIntValues {
    type Value = u64;
    type Ref<'a> = u64;

    const VALUE_TYPE: ValueType = ValueType::VInt;

    #[inline]
    fn header_value(value: &u64) -> u64 {
        *value
    }

    #[inline]
    fn payload(_value: &u64) -> &[u8] {
        &[]
    }

    #[inline]
    fn payload_len(_header: u64) -> u64 {
        0
    }

    #[inline]
    fn read_value<'a, B: TrieBuffer + ?Sized>(_buf: &'a B, header: u64, _ptr: usize) -> Option<u64> {
        Some(header)
    }

    #[inline]
    fn to_owned_value(value: u64) -> u64 {
        value
    }
}

/// Byte-array values: the leading VInt holds the length, the bytes follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesValues;

impl ValueCodec for BytesValues {
    type Value = Vec<u8>;
    type Ref<'a> = &'a [u8];

    const VALUE_TYPE: ValueType = ValueType::Bytes;

    #[inline]
    fn header_value(value: &Vec<u8>) -> u64 {
        value.len() as u64
    }

    #[inline]
    fn payload(value: &Vec<u8>) -> &[u8] {
        value
    }

    #[inline]
    fn payload_len(header: u64) -> u64 {
        header
    }

    #[inline]
    fn read_value<'a, B: TrieBuffer + ?Sized>(buf: &'a B, header: u64, ptr: usize) -> Option<&'a [u8]> {
        buf.region(ptr, usize::try_from(header).ok()?)
    }

    #[inline]
    fn to_owned_value(value: &[u8]) -> Vec<u8> {
        value.to_vec()
    }
}
