//! Crate-wide error type.
//!
//! Mirrors the error categories from the design: argument misuse, illegal
//! state, I/O failure, cache-discipline violation, and construction failure.
//! Each category is its own small enum so callers can match on the kind of
//! failure they actually care about without wading through the others.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// Invalid arguments passed to an operation.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("required argument was null/empty")]
    Missing,

    #[error("byte array must not be empty")]
    EmptyArray,

    #[error("count must be positive, got {0}")]
    NonPositiveCount(i64),

    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("value {0} is outside the byte range [0,255]")]
    OutOfByteRange(i64),

    #[error("no byte at position {0}")]
    NoByteAtPosition(u64),
}

/// Illegal operations given the current state of a reader, channel, or
/// stream.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("reader is closed")]
    ReaderClosed,

    #[error("channel is closed")]
    ChannelClosed,

    #[error("mark is not supported")]
    MarkNotSupported,

    #[error("reset called without a prior mark")]
    NoMarkSet,

    #[error("channel is not writable")]
    NotWritable,

    #[error("temp file at {path} was not deleted: {source}")]
    TempFileNotDeleted {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cache-discipline violations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("window at position {offered} is not contiguous with cache end {expected}")]
    NonSequentialWindow { expected: u64, offered: u64 },

    #[error("cache temp file does not exist at {0}")]
    TempFileMissing(PathBuf),
}

/// Failures building a matcher or searcher from the wrong shape of input.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("cannot build ByteSequenceMatcher: position {0} matches more than one byte")]
    NotAByteSequence(usize),

    #[error("soft window recovery returned {got} bytes, expected {expected}")]
    RecoveryLengthMismatch { expected: usize, got: usize },
}
