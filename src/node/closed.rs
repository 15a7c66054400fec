//! Closed (immutable) trie nodes.

use crate::error::{Error, Result};
use crate::node::value::ValueCodec;
use crate::node::{
    NodeType, FIRST_BYTE_BITS_FOR_BRANCHES, FIRST_BYTE_BITS_FOR_LEAVES, FULL_BYTE_BITS,
    MINIMUM_SCRATCH_LENGTH,
};
use crate::vint;
use bytes::BufMut;
use std::convert::Infallible;
use std::io::Write;

/// A child entry of a branch: the byte leading to it plus the node itself.
#[derive(Debug, Clone)]
pub struct Child<C: ValueCodec> {
    /// Byte the parent branches on to reach this node.
    pub byte: u8,
    /// The child node.
    pub node: ClosedNode<C>,
}

impl<C: ValueCodec> Child<C> {
    /// Create a new child entry
    pub fn new(byte: u8, node: ClosedNode<C>) -> Self {
        Self { byte, node }
    }

    /// Bytes this entry takes inside its parent's children block
    pub fn entry_length(&self) -> u64 {
        1 + self.node.length()
    }
}

/// A finished subtree, ready to be serialized.
///
/// Construct these through [`NodeFactory`](crate::node::NodeFactory), which
/// keeps the cached branch content lengths consistent with the children.
#[derive(Debug, Clone)]
pub enum ClosedNode<C: ValueCodec> {
    /// Leaf ending exactly at this node.
    SimpleLeaf {
        /// Terminal value.
        value: C::Value,
    },

    /// Leaf that still has to match literal key bytes.
    SuffixLeaf {
        /// Terminal value.
        value: C::Value,
        /// Remaining key bytes, at least one.
        suffix: Vec<u8>,
    },

    /// Branch without a value of its own.
    SimpleBranch {
        /// Children in serialization order.
        children: Vec<Child<C>>,
        /// Total length of the children block.
        content_len: u64,
    },

    /// Branch that also terminates a key.
    ValueBranch {
        /// Value for the key ending here.
        value: C::Value,
        /// Children in serialization order.
        children: Vec<Child<C>>,
        /// Total length of the children block.
        content_len: u64,
    },

    /// Pre-flattened bytes of another closed node.
    Serialized {
        /// Exact serialization of the flattened node.
        bytes: Vec<u8>,
    },
}

/// Destination for node bytes: either an in-memory buffer or a stream.
trait Sink {
    type Error;

    fn put(&mut self, bytes: &[u8]) -> std::result::Result<(), Self::Error>;
}

struct BufSink<'a, B>(&'a mut B);

impl<B: BufMut> Sink for BufSink<'_, B> {
    type Error = Infallible;

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> std::result::Result<(), Infallible> {
        self.0.put_slice(bytes);
        Ok(())
    }
}

struct WriteSink<'a, W>(&'a mut W);

impl<W: Write> Sink for WriteSink<'_, W> {
    type Error = std::io::Error;

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.0.write_all(bytes)
    }
}

impl<C: ValueCodec> ClosedNode<C> {
    /// Wrap the serialized payload of a node (for example the payload of a
    /// loaded trie) so it can be written out again unchanged.
    pub fn from_serialized(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::invalid_argument("serialized node cannot be empty"));
        }
        Ok(ClosedNode::Serialized { bytes })
    }

    /// Structural type of this node.
    pub fn node_type(&self) -> NodeType {
        match self {
            ClosedNode::SimpleLeaf { .. } => NodeType::SimpleLeaf,
            ClosedNode::SuffixLeaf { .. } => NodeType::SuffixLeaf,
            ClosedNode::SimpleBranch { .. } => NodeType::SimpleBranch,
            ClosedNode::ValueBranch { .. } => NodeType::ValueBranch,
            ClosedNode::Serialized { bytes } => NodeType::from_lead_byte(bytes[0]),
        }
    }

    /// The 2-bit tag written into the top of the leading byte.
    pub fn type_bits(&self) -> u8 {
        self.node_type().type_bits()
    }

    /// Whether this node is a leaf (possibly a flattened one).
    pub fn is_leaf(&self) -> bool {
        self.node_type().is_leaf()
    }

    /// Whether this node has been flattened into raw bytes.
    pub fn is_serialized(&self) -> bool {
        matches!(self, ClosedNode::Serialized { .. })
    }

    /// Exact number of bytes [`serialize`](Self::serialize) produces.
    pub fn length(&self) -> u64 {
        match self {
            ClosedNode::SimpleLeaf { value } => C::value_length(value, FIRST_BYTE_BITS_FOR_LEAVES),
            ClosedNode::SuffixLeaf { value, suffix } => {
                let len = suffix.len() as u64;
                C::value_length(value, FIRST_BYTE_BITS_FOR_LEAVES)
                    + vint::length_for_unsigned(len, FULL_BYTE_BITS) as u64
                    + len
            }
            ClosedNode::SimpleBranch { content_len, .. } => {
                vint::length_for_unsigned(*content_len, FIRST_BYTE_BITS_FOR_BRANCHES) as u64
                    + content_len
            }
            ClosedNode::ValueBranch { value, content_len, .. } => {
                C::value_length(value, FIRST_BYTE_BITS_FOR_BRANCHES)
                    + vint::length_for_unsigned(*content_len, FULL_BYTE_BITS) as u64
                    + content_len
            }
            ClosedNode::Serialized { bytes } => bytes.len() as u64,
        }
    }

    /// OR this node's type tag into a byte already holding VInt data.
    #[inline]
    pub fn add_type_bits(&self, buf: &mut [u8], offset: usize) {
        buf[offset] |= self.type_bits() << 6;
    }

    /// Serialize the node into a new buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length() as usize);
        self.serialize_into(&mut out);
        out
    }

    /// Serialize the node into an in-memory buffer.
    ///
    /// # Panics
    ///
    /// Panics if `buf` cannot grow to hold [`length`](Self::length) more bytes.
    pub fn serialize_into<B: BufMut>(&self, buf: &mut B) {
        let mut scratch = [0u8; MINIMUM_SCRATCH_LENGTH];
        match self.emit(&mut BufSink(buf), &mut scratch) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Stream the node to `out`, staging VInts in `scratch`.
    ///
    /// Nothing is allocated per node, so this is the way to write out tries
    /// too large to materialize in memory a second time.
    pub fn serialize_to<W: Write>(&self, out: &mut W, scratch: &mut [u8]) -> Result<()> {
        if scratch.len() < MINIMUM_SCRATCH_LENGTH {
            return Err(Error::invalid_argument(format!(
                "scratch buffer too small: need {} bytes, got {}",
                MINIMUM_SCRATCH_LENGTH,
                scratch.len()
            )));
        }
        self.emit(&mut WriteSink(out), scratch)?;
        Ok(())
    }

    fn emit<S: Sink>(&self, sink: &mut S, scratch: &mut [u8]) -> std::result::Result<(), S::Error> {
        match self {
            ClosedNode::SimpleLeaf { value } => {
                self.emit_lead(sink, scratch, C::header_value(value), FIRST_BYTE_BITS_FOR_LEAVES)?;
                sink.put(C::payload(value))
            }
            ClosedNode::SuffixLeaf { value, suffix } => {
                self.emit_lead(sink, scratch, C::header_value(value), FIRST_BYTE_BITS_FOR_LEAVES)?;
                sink.put(C::payload(value))?;
                let len = vint::unsigned_to_bytes(suffix.len() as u64, FULL_BYTE_BITS, scratch, 0);
                sink.put(&scratch[..len])?;
                sink.put(suffix)
            }
            ClosedNode::SimpleBranch { children, content_len } => {
                self.emit_lead(sink, scratch, *content_len, FIRST_BYTE_BITS_FOR_BRANCHES)?;
                Self::emit_children(children, sink, scratch)
            }
            ClosedNode::ValueBranch { value, children, content_len } => {
                self.emit_lead(sink, scratch, C::header_value(value), FIRST_BYTE_BITS_FOR_BRANCHES)?;
                sink.put(C::payload(value))?;
                let len = vint::unsigned_to_bytes(*content_len, FULL_BYTE_BITS, scratch, 0);
                sink.put(&scratch[..len])?;
                Self::emit_children(children, sink, scratch)
            }
            ClosedNode::Serialized { bytes } => sink.put(bytes),
        }
    }

    /// Write the leading VInt with the type tag stolen from its top bits
    fn emit_lead<S: Sink>(
        &self,
        sink: &mut S,
        scratch: &mut [u8],
        value: u64,
        first_byte_bits: u32,
    ) -> std::result::Result<(), S::Error> {
        let len = vint::unsigned_to_bytes(value, first_byte_bits, scratch, 0);
        self.add_type_bits(scratch, 0);
        sink.put(&scratch[..len])
    }

    fn emit_children<S: Sink>(
        children: &[Child<C>],
        sink: &mut S,
        scratch: &mut [u8],
    ) -> std::result::Result<(), S::Error> {
        for child in children {
            sink.put(&[child.byte])?;
            child.node.emit(sink, scratch)?;
        }
        Ok(())
    }
}
