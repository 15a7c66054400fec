//! Trie node model.
//!
//! Closed nodes are the immutable, serializable form of a finished subtree.
//! Every node starts with a "leading VInt" whose top two bits are replaced by
//! the node type tag:
//!
//! ```text
//! Simple Leaf        [value*]
//! Leaf-with-Suffix   [value*] [suffix_len: VInt(8)] [suffix bytes]
//! Simple Branch      [content_len*] ([byte] [child])...
//! Branch-with-Value  [value*] [content_len: VInt(8)] ([byte] [child])...
//!
//! * = leading VInt with 6 value bits, tag in bits 6-7
//! ```
//!
//! The byte leading to a node is written by its parent, never by the node
//! itself, so the root carries no leading byte at all. How a value is laid out
//! depends on the [`ValueCodec`] of the trie.

pub mod closed;
pub mod factory;
pub mod value;

pub use closed::{Child, ClosedNode};
pub use factory::NodeFactory;
pub use value::{BytesValues, VIntValues, ValueCodec};

/// Type tag of a leaf that ends exactly at its leading byte.
pub const TYPE_LEAF_SIMPLE: u8 = 0;

/// Type tag of a leaf followed by literal key suffix bytes.
pub const TYPE_LEAF_WITH_SUFFIX: u8 = 1;

/// Type tag of a branch without a value of its own.
pub const TYPE_BRANCH_SIMPLE: u8 = 2;

/// Type tag of a branch that also terminates a key.
pub const TYPE_BRANCH_WITH_VALUE: u8 = 3;

/// Value bits available in the leading byte of a branch.
pub const FIRST_BYTE_BITS_FOR_BRANCHES: u32 = 6;

/// Value bits available in the leading byte of a leaf.
pub const FIRST_BYTE_BITS_FOR_LEAVES: u32 = 6;

/// Bits used by VInts that are not the leading field of a node
/// (suffix lengths, branch content lengths after a value).
pub const FULL_BYTE_BITS: u32 = 8;

/// Smallest scratch buffer accepted by [`ClosedNode::serialize_to`].
///
/// The scratch buffer holds one VInt at a time, at most
/// [`vint::MAX_VINT_LENGTH`](crate::vint::MAX_VINT_LENGTH) bytes.
pub const MINIMUM_SCRATCH_LENGTH: usize = 64;

/// Node type as decoded from the top two bits of a leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    /// Leaf with no suffix.
    SimpleLeaf = TYPE_LEAF_SIMPLE,
    /// Leaf with a literal key suffix.
    SuffixLeaf = TYPE_LEAF_WITH_SUFFIX,
    /// Branch without a value.
    SimpleBranch = TYPE_BRANCH_SIMPLE,
    /// Branch carrying a value.
    ValueBranch = TYPE_BRANCH_WITH_VALUE,
}

impl NodeType {
    /// Decodes the type tag stored in the leading byte of a node.
    #[inline]
    pub fn from_lead_byte(b: u8) -> Self {
        match b >> 6 {
            TYPE_LEAF_SIMPLE => NodeType::SimpleLeaf,
            TYPE_LEAF_WITH_SUFFIX => NodeType::SuffixLeaf,
            TYPE_BRANCH_SIMPLE => NodeType::SimpleBranch,
            _ => NodeType::ValueBranch,
        }
    }

    /// The 2-bit tag for this type.
    #[inline]
    pub fn type_bits(self) -> u8 {
        self as u8
    }

    /// Whether nodes of this type are leaves.
    #[inline]
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeType::SimpleLeaf | NodeType::SuffixLeaf)
    }
}
