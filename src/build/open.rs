//! Open (still mutable) nodes on the builder's current path.

use crate::build::BuildStats;
use crate::config::BuildOptions;
use crate::error::Result;
use crate::node::{Child, ClosedNode, NodeFactory, ValueCodec};
use std::cmp::Reverse;

/// A node on the path of the most recently added key.
///
/// Its children are all closed: only the rightmost path of the trie is ever
/// open, and an open node is closed exactly once, when the input moves past
/// its prefix.
#[derive(Debug)]
pub struct OpenNode<C: ValueCodec> {
    /// Byte the parent branches on to reach this node (unused for the root).
    pub byte: u8,
    /// Value of the key ending at this node, if any.
    pub value: Option<C::Value>,
    /// Closed children in ascending byte order.
    pub children: Vec<Child<C>>,
}

impl<C: ValueCodec> OpenNode<C> {
    /// The root node: no branch byte, no value yet.
    pub fn root() -> Self {
        Self::new(0)
    }

    /// An empty node reached through `byte`.
    pub fn new(byte: u8) -> Self {
        Self { byte, value: None, children: Vec::new() }
    }

    /// Turn this node into its immutable form.
    ///
    /// A single leaf child under a valueless node is folded into a suffix
    /// leaf, which is what keeps long unique key tails compact. Branches
    /// shorter than the serialization threshold are flattened right away.
    pub fn close(
        self,
        factory: &NodeFactory<C>,
        options: &BuildOptions,
        stats: &mut BuildStats,
    ) -> Result<ClosedNode<C>> {
        let OpenNode { value, mut children, .. } = self;

        if children.is_empty() {
            return Ok(match value {
                Some(value) => {
                    stats.leaves += 1;
                    factory.simple_leaf(value)
                }
                // Only the root of an empty trie ends up here
                None => {
                    stats.branches += 1;
                    factory.simple_branch(children)
                }
            });
        }

        if value.is_none() && children.len() == 1 && children[0].node.is_leaf() {
            let child = children.remove(0);
            stats.suffix_folds += 1;
            return factory.suffix_leaf(child.byte, child.node);
        }

        if options.reorder_children {
            children.sort_by_key(|child| Reverse(child.node.length()));
        }

        let node = match value {
            Some(value) => {
                stats.value_branches += 1;
                factory.value_branch(value, children)
            }
            None => {
                stats.branches += 1;
                factory.simple_branch(children)
            }
        };

        let length = node.length();
        if length < options.serialize_threshold {
            log::trace!("Flattening {:?} of {} bytes", node.node_type(), length);
            stats.serialized_nodes += 1;
            return Ok(factory.serialized(node));
        }
        Ok(node)
    }
}
