//! Sequence search: position of a [`ByteSequenceMatcher`] within an array
//! or a windowed reader, scanning forwards or backwards.
//!
//! `SequenceSearcher` implementations search arrays directly; the
//! reader-driven loop in `reader_search` repeatedly asks a
//! [`WindowReader`] for the window covering the current candidate
//! position and hands the array-based searcher a clipped slice of it,
//! falling back to [`SequenceMatcher::matches_reader`] for any candidate
//! whose match would straddle a window boundary.

mod horspool;
mod qgram;
mod reader_search;
mod shift_or;

pub use horspool::HorspoolSearcher;
pub use qgram::QGramSearcher;
pub use shift_or::ShiftOrSearcher;

use crate::error::Result;
use crate::matcher::ByteSequenceMatcher;
use crate::reader::WindowReader;

pub(crate) use reader_search::{search_reader_backwards, search_reader_forwards};

/// Searches for a [`ByteSequenceMatcher`] within an array or a windowed
/// reader. `search_forwards`/`search_backwards` return a negative value
/// when no match is found in `[from, to]` without otherwise specifying
/// which; callers should treat any negative result as "not found".
pub trait SequenceSearcher {
    fn pattern(&self) -> &ByteSequenceMatcher;

    /// Builds (or rebuilds) whatever table this searcher needs for a
    /// forward search. Idempotent; implementations cache the result.
    fn prepare_forwards(&self);

    /// As `prepare_forwards`, for a backward search.
    fn prepare_backwards(&self);

    /// Position of the first match with `from <= position <= to`, scanning
    /// left to right. `from > to` returns a negative value without
    /// reading.
    fn search_forwards(&self, array: &[u8], from: i64, to: i64) -> i64;

    /// Position of the first match encountered scanning right to left,
    /// starting at `from` and stopping at `to` (`from >= to`). Among
    /// positions in `[to, from]` this is the largest matching one.
    fn search_backwards(&self, array: &[u8], from: i64, to: i64) -> i64;

    /// As `search_forwards`, spanning as many windows of `reader` as
    /// needed. `Ok(-1)` when no match is found before `to` or
    /// end-of-source.
    fn search_forwards_reader(
        &self,
        reader: &mut dyn WindowReader,
        from: u64,
        to: u64,
    ) -> Result<i64> {
        self.prepare_forwards();
        search_reader_forwards(self, reader, from, to)
    }

    /// As `search_backwards`, spanning as many windows of `reader` as
    /// needed.
    fn search_backwards_reader(
        &self,
        reader: &mut dyn WindowReader,
        from: u64,
        to: u64,
    ) -> Result<i64> {
        self.prepare_backwards();
        search_reader_backwards(self, reader, from, to)
    }
}
