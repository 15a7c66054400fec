//! Error types for the tr13 trie builder and lookup engine.

use std::io;
use thiserror::Error;

/// The result type used throughout tr13.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for tr13 operations.
///
/// A key that is simply absent from a trie is not an error; lookups report
/// that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred while reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Build input was not in strictly ascending key order.
    #[error("Input out of order at position {position}: {message}")]
    OutOfOrder {
        /// Position of the offending entry, as reported by the input source.
        position: u64,
        /// Description of the ordering violation.
        message: String,
    },

    /// Build input contained the same key twice.
    #[error("Duplicate key at position {position}")]
    DuplicateKey {
        /// Position of the repeated entry, as reported by the input source.
        position: u64,
    },

    /// The serialized trie has an unrecognized header or impossible framing.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Trie bytes were found inconsistent while traversing them.
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant was broken.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Creates a new invalid format error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Creates a new ordering error for the entry at `position`.
    pub fn out_of_order(position: u64, msg: impl Into<String>) -> Self {
        Error::OutOfOrder { position, message: msg.into() }
    }
}
