//! Configuration options for building tries.

use serde::{Deserialize, Serialize};

/// Branch nodes shorter than this many bytes are flattened as soon as they
/// are closed.
pub const DEFAULT_SERIALIZE_THRESHOLD: u64 = 64_000;

/// How many keys to process between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1 << 20;

/// What the builder does when it sees the same key twice in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Abort the build with [`Error::DuplicateKey`](crate::Error::DuplicateKey).
    #[default]
    Error,

    /// Keep the first value, drop the repeat and count it in
    /// [`BuildStats::duplicates_skipped`](crate::build::BuildStats::duplicates_skipped).
    Skip,
}

/// Configuration options for [`TrieBuilder`](crate::build::TrieBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Sort the children of every branch by descending serialized length,
    /// so that larger subtrees are scanned first during lookups.
    /// Default: false
    pub reorder_children: bool,

    /// Branches whose serialized length is below this many bytes are
    /// flattened into raw bytes right after closing, releasing their node
    /// graph.
    /// Default: 64,000
    pub serialize_threshold: u64,

    /// Handling of repeated keys.
    /// Default: DuplicatePolicy::Error
    pub duplicate_policy: DuplicatePolicy,

    /// Number of keys between progress log lines and observer calls.
    /// Set to 0 to disable progress reporting.
    /// Default: 1,048,576
    pub progress_interval: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            reorder_children: false,
            serialize_threshold: DEFAULT_SERIALIZE_THRESHOLD,
            duplicate_policy: DuplicatePolicy::Error,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl BuildOptions {
    /// Creates a new BuildOptions with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether branch children are reordered by size.
    pub fn reorder_children(mut self, value: bool) -> Self {
        self.reorder_children = value;
        self
    }

    /// Sets the eager serialization threshold.
    pub fn serialize_threshold(mut self, bytes: u64) -> Self {
        self.serialize_threshold = bytes;
        self
    }

    /// Sets the duplicate key policy.
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Sets the progress reporting interval.
    pub fn progress_interval(mut self, keys: u64) -> Self {
        self.progress_interval = keys;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.serialize_threshold == 0 {
            return Err(crate::Error::invalid_argument("serialize_threshold must be > 0"));
        }
        Ok(())
    }
}
