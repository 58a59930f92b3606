//! A windowed byte-reader and byte/sequence matcher library: random-access
//! reads over arrays, files, and forward-only streams through a pluggable
//! cache of fixed-size windows, plus a byte-matcher algebra and a family of
//! sequence searchers that work directly against that windowed view.
//!
//! - [`error`] — the crate-wide `Error` type.
//! - [`window`] — `Window`, the unit every cache and reader deals in.
//! - [`cache`] — `WindowCache` and its bounded/tiered implementations.
//! - [`reader`] — `WindowReader` and its array/file/stream implementations.
//! - [`matcher`] — `ByteMatcher` and the `SequenceMatcher` family built on it.
//! - [`search`] — `SequenceSearcher` and its Shift-Or/Horspool/q-gram
//!   implementations.

pub mod cache;
pub mod error;
pub mod matcher;
pub mod reader;
pub mod search;
pub mod window;

pub use error::{ArgumentError, CacheError, CompositionError, Error, Result, StateError};
pub use window::{SoftWindowRecovery, Window};
