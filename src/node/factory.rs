//! Construction of closed nodes for one value type.

use crate::error::{Error, Result};
use crate::node::closed::{Child, ClosedNode};
use crate::node::value::ValueCodec;
use std::marker::PhantomData;

/// Creates closed nodes of every kind for value codec `C`.
///
/// The factory carries no state; it exists so that the builder can be written
/// once against `C` and reused for every value type.
#[derive(Debug)]
pub struct NodeFactory<C: ValueCodec> {
    _codec: PhantomData<fn() -> C>,
}

impl<C: ValueCodec> Default for NodeFactory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ValueCodec> Clone for NodeFactory<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ValueCodec> Copy for NodeFactory<C> {}

impl<C: ValueCodec> NodeFactory<C> {
    /// Create a new NodeFactory
    pub fn new() -> Self {
        Self { _codec: PhantomData }
    }

    /// A leaf that ends the key at this node.
    pub fn simple_leaf(&self, value: C::Value) -> ClosedNode<C> {
        ClosedNode::SimpleLeaf { value }
    }

    /// Fold a leaf reached through `branch_byte` into a suffix leaf one level
    /// up: the byte becomes the first byte of the leaf's suffix.
    ///
    /// Only leaves can be folded; anything else is an internal error.
    pub fn suffix_leaf(&self, branch_byte: u8, node: ClosedNode<C>) -> Result<ClosedNode<C>> {
        match node {
            ClosedNode::SimpleLeaf { value } => Ok(ClosedNode::SuffixLeaf { value, suffix: vec![branch_byte] }),
            ClosedNode::SuffixLeaf { value, mut suffix } => {
                suffix.insert(0, branch_byte);
                Ok(ClosedNode::SuffixLeaf { value, suffix })
            }
            other => Err(Error::internal(format!(
                "cannot fold {:?} node into a suffix leaf",
                other.node_type()
            ))),
        }
    }

    /// A branch with no value of its own.
    pub fn simple_branch(&self, children: Vec<Child<C>>) -> ClosedNode<C> {
        let content_len = Self::content_length(&children);
        ClosedNode::SimpleBranch { children, content_len }
    }

    /// A branch that also terminates a key.
    pub fn value_branch(&self, value: C::Value, children: Vec<Child<C>>) -> ClosedNode<C> {
        let content_len = Self::content_length(&children);
        ClosedNode::ValueBranch { value, children, content_len }
    }

    /// Flatten `node` into its serialized bytes, dropping its node graph.
    pub fn serialized(&self, node: ClosedNode<C>) -> ClosedNode<C> {
        if node.is_serialized() {
            return node;
        }
        ClosedNode::Serialized { bytes: node.serialize() }
    }

    fn content_length(children: &[Child<C>]) -> u64 {
        children.iter().map(Child::entry_length).sum()
    }
}
