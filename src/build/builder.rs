//! Streaming trie builder.
//!
//! Builds a trie from keys supplied in strictly ascending byte order.

use crate::build::open::OpenNode;
use crate::build::source::KeyValueSource;
use crate::config::{BuildOptions, DuplicatePolicy};
use crate::error::{Error, Result};
use crate::header::{TrieHeader, HEADER_LENGTH};
use crate::node::{Child, ClosedNode, NodeFactory, ValueCodec, MINIMUM_SCRATCH_LENGTH};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Counters collected while building a trie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Keys stored in the trie
    pub keys_added: u64,
    /// Repeated keys dropped under [`DuplicatePolicy::Skip`]
    pub duplicates_skipped: u64,
    /// Simple leaves created
    pub leaves: u64,
    /// Leaves folded into a parent as suffix leaves
    pub suffix_folds: u64,
    /// Branches without values
    pub branches: u64,
    /// Branches with values
    pub value_branches: u64,
    /// Branches flattened to bytes on close
    pub serialized_nodes: u64,
    /// Length of the root serialization; set once the build finishes
    pub payload_length: u64,
    /// How far the source got, as reported by [`KeyValueSource::position`];
    /// `None` for builds fed through [`TrieBuilder::add`]
    pub input_position: Option<u64>,
}

type Observer = Box<dyn FnMut(&BuildStats)>;

/// TrieBuilder turns sorted key/value pairs into a [`ClosedNode`] tree.
///
/// Usage:
/// ```
/// use tr13::{BuildOptions, TrieBuilder, VIntValues};
///
/// let mut builder = TrieBuilder::<VIntValues>::new(BuildOptions::default()).unwrap();
/// builder.add(b"key1", 1).unwrap();
/// builder.add(b"key2", 2).unwrap();
/// let root = builder.finish().unwrap();
/// assert!(!root.serialize().is_empty());
/// ```
pub struct TrieBuilder<C: ValueCodec> {
    options: BuildOptions,
    factory: NodeFactory<C>,
    /// Open path of the previous key; `spine[0]` is the root and
    /// `spine[i]` is reached through the key's byte `i - 1`.
    spine: Vec<OpenNode<C>>,
    has_previous: bool,
    entries_seen: u64,
    stats: BuildStats,
    observer: Option<Observer>,
}

impl<C: ValueCodec> std::fmt::Debug for TrieBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrieBuilder")
            .field("options", &self.options)
            .field("depth", &self.spine.len().saturating_sub(1))
            .field("stats", &self.stats)
            .finish()
    }
}

impl<C: ValueCodec> TrieBuilder<C> {
    /// Create a new TrieBuilder
    pub fn new(options: BuildOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            factory: NodeFactory::new(),
            spine: vec![OpenNode::root()],
            has_previous: false,
            entries_seen: 0,
            stats: BuildStats::default(),
            observer: None,
        })
    }

    /// Call `observer` with the running counters every
    /// [`progress_interval`](BuildOptions::progress_interval) keys, and once
    /// more when the build finishes.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&BuildStats) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Counters so far
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Add a key/value pair.
    ///
    /// Keys must be added in strictly ascending byte order; positions in
    /// errors count calls to this method, starting at 1.
    pub fn add(&mut self, key: &[u8], value: C::Value) -> Result<()> {
        self.entries_seen += 1;
        self.add_at(key, value, self.entries_seen)
    }

    fn add_at(&mut self, key: &[u8], value: C::Value, position: u64) -> Result<()> {
        let previous_len = self.spine.len() - 1;
        let common = key
            .iter()
            .zip(&self.spine[1..])
            .take_while(|(byte, node)| **byte == node.byte)
            .count();

        if common == key.len() {
            if !self.has_previous {
                // Empty first key: its value lives on the root
                self.spine[0].value = Some(value);
                self.has_previous = true;
                self.key_added();
                return Ok(());
            }
            if key.len() == previous_len {
                return self.duplicate(position);
            }
            return Err(Error::out_of_order(
                position,
                format!(
                    "key of {} bytes is a prefix of the previous key ({} bytes)",
                    key.len(),
                    previous_len
                ),
            ));
        }

        if common < previous_len {
            let previous = self.spine[common + 1].byte;
            if key[common] < previous {
                return Err(Error::out_of_order(
                    position,
                    format!(
                        "byte 0x{:02x} at offset {} sorts before 0x{:02x} of the previous key",
                        key[common], common, previous
                    ),
                ));
            }
        }

        self.close_to(common + 1)?;
        self.spine.extend(key[common..].iter().map(|&byte| OpenNode::new(byte)));
        if let Some(last) = self.spine.last_mut() {
            last.value = Some(value);
        }
        self.has_previous = true;
        self.key_added();
        Ok(())
    }

    fn duplicate(&mut self, position: u64) -> Result<()> {
        match self.options.duplicate_policy {
            DuplicatePolicy::Error => Err(Error::DuplicateKey { position }),
            DuplicatePolicy::Skip => {
                log::warn!("Skipping duplicate key at position {}", position);
                self.stats.duplicates_skipped += 1;
                Ok(())
            }
        }
    }

    fn key_added(&mut self) {
        self.stats.keys_added += 1;
        let interval = self.options.progress_interval;
        if interval > 0 && self.stats.keys_added % interval == 0 {
            log::info!(
                "Added {} keys, {} nodes flattened",
                self.stats.keys_added,
                self.stats.serialized_nodes
            );
            if let Some(observer) = self.observer.as_mut() {
                observer(&self.stats);
            }
        }
    }

    /// Close open nodes until only `depth` remain on the path.
    fn close_to(&mut self, depth: usize) -> Result<()> {
        while self.spine.len() > depth {
            let Some(node) = self.spine.pop() else { break };
            let byte = node.byte;
            let closed = node.close(&self.factory, &self.options, &mut self.stats)?;
            let parent = self
                .spine
                .last_mut()
                .ok_or_else(|| Error::internal("open path lost its root"))?;
            parent.children.push(Child::new(byte, closed));
        }
        Ok(())
    }

    /// Close everything and return the root.
    pub fn finish(self) -> Result<ClosedNode<C>> {
        self.finish_with_stats().map(|(root, _)| root)
    }

    /// Close everything and return the root along with the final counters.
    pub fn finish_with_stats(mut self) -> Result<(ClosedNode<C>, BuildStats)> {
        self.close_to(1)?;
        let root = self
            .spine
            .pop()
            .ok_or_else(|| Error::internal("open path lost its root"))?;
        let root = root.close(&self.factory, &self.options, &mut self.stats)?;

        self.stats.payload_length = root.length();
        log::info!(
            "Trie complete: {} keys, {} payload bytes",
            self.stats.keys_added,
            self.stats.payload_length
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.stats);
        }
        Ok((root, self.stats))
    }

    /// Add every entry of `source`, then finish.
    ///
    /// Ordering errors carry the positions the source reports.
    pub fn build<S>(mut self, source: &mut S) -> Result<ClosedNode<C>>
    where
        S: KeyValueSource<C::Value>,
    {
        log::info!("Building {:?} trie", C::VALUE_TYPE);
        self.consume(source)?;
        self.finish()
    }

    fn consume<S>(&mut self, source: &mut S) -> Result<()>
    where
        S: KeyValueSource<C::Value>,
    {
        let result = source.read_all(|key, value, position| self.add_at(key, value, position));
        self.stats.input_position = source.position();
        if let Err(e) = &result {
            match self.stats.input_position {
                Some(position) => log::error!("Build stopped at input position {}: {}", position, e),
                None => log::error!("Build stopped: {}", e),
            }
        }
        result
    }

    /// Build from `source` and stream the result to `out`, preceded by the
    /// file header if `write_header` is set.
    pub fn build_and_write<S, W>(mut self, source: &mut S, out: &mut W, write_header: bool) -> Result<BuildStats>
    where
        S: KeyValueSource<C::Value>,
        W: Write,
    {
        self.consume(source)?;
        let (root, stats) = self.finish_with_stats()?;
        write_trie(&root, out, write_header)?;
        Ok(stats)
    }
}

/// Write `root` to `out`, optionally preceded by the header, and return the
/// number of bytes written.
pub fn write_trie<C: ValueCodec, W: Write>(root: &ClosedNode<C>, out: &mut W, write_header: bool) -> Result<u64> {
    let payload_length = root.length();
    let mut written = 0;
    if write_header {
        TrieHeader::new(C::VALUE_TYPE, payload_length).write_to(out)?;
        written += HEADER_LENGTH as u64;
    }

    let mut scratch = [0u8; MINIMUM_SCRATCH_LENGTH];
    root.serialize_to(out, &mut scratch)?;
    out.flush()?;

    log::debug!("Wrote trie: {} payload bytes", payload_length);
    Ok(written + payload_length)
}
