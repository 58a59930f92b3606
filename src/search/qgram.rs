//! A q-gram hashed shift searcher (Wu-Manber family): hashes a window of
//! `q` consecutive bytes into a fixed-size table of skip distances, the
//! same "mask a few bytes into a small table index" shape as
//! `campross::lz77::Writer::hash_at`, generalized from a fixed 3-byte hash
//! to a configurable q-gram width.
//!
//! Falls back to [`super::ShiftOrSearcher`] when the pattern is shorter
//! than `q` — there would be no q-gram to hash at all. The fallback
//! decision is made once, the first time either direction is prepared or
//! searched, and is then frozen for the lifetime of the searcher.

use once_cell::sync::OnceCell;

use crate::matcher::{ByteSequenceMatcher, SequenceMatcher};

use super::shift_or::ShiftOrSearcher;
use super::SequenceSearcher;

const TABLE_SIZE: usize = 1 << 12;

fn hash_qgram(bytes: &[u8]) -> usize {
    let mut h: usize = 0;
    for &b in bytes {
        h = (h << 5) ^ (h >> 3) ^ b as usize;
    }
    h % TABLE_SIZE
}

struct QGramTable {
    q: usize,
    default_shift: usize,
    shift: Vec<usize>,
}

impl QGramTable {
    /// `shift[hash(window tail)]`: how far a forward scan can safely
    /// advance its window start.
    fn forward(pattern: &[u8], q: usize) -> Self {
        let m = pattern.len();
        let default_shift = m - q + 1;
        let mut shift = vec![default_shift; TABLE_SIZE];
        for i in 0..m - q {
            let h = hash_qgram(&pattern[i..i + q]);
            shift[h] = (m - q) - i;
        }
        let last = hash_qgram(&pattern[m - q..m]);
        shift[last] = 0;
        QGramTable { q, default_shift, shift }
    }

    /// `shift[hash(window head)]`: how far a backward scan can safely
    /// retreat its window start.
    fn backward(pattern: &[u8], q: usize) -> Self {
        let m = pattern.len();
        let default_shift = m - q + 1;
        let mut shift = vec![default_shift; TABLE_SIZE];
        for i in (1..=m - q).rev() {
            let h = hash_qgram(&pattern[i..i + q]);
            shift[h] = i;
        }
        let first = hash_qgram(&pattern[0..q]);
        shift[first] = 0;
        QGramTable { q, default_shift, shift }
    }

    fn shift_for(&self, window: &[u8]) -> usize {
        self.shift.get(hash_qgram(window)).copied().unwrap_or(self.default_shift)
    }
}

enum Tables {
    QGram { forward: QGramTable, backward: QGramTable },
    Fallback(ShiftOrSearcher),
}

pub struct QGramSearcher {
    pattern: ByteSequenceMatcher,
    q: usize,
    tables: OnceCell<Tables>,
}

impl QGramSearcher {
    pub fn new(pattern: ByteSequenceMatcher, q: usize) -> Self {
        QGramSearcher { pattern, q, tables: OnceCell::new() }
    }

    fn tables(&self) -> &Tables {
        self.tables.get_or_init(|| {
            if self.pattern.length() < self.q {
                log::debug!(
                    "pattern of length {} shorter than q={}, falling back to shift-or",
                    self.pattern.length(),
                    self.q
                );
                Tables::Fallback(ShiftOrSearcher::new(self.pattern.clone()))
            } else {
                Tables::QGram {
                    forward: QGramTable::forward(self.pattern.as_bytes(), self.q),
                    backward: QGramTable::backward(self.pattern.as_bytes(), self.q),
                }
            }
        })
    }
}

impl SequenceSearcher for QGramSearcher {
    fn pattern(&self) -> &ByteSequenceMatcher {
        &self.pattern
    }

    fn prepare_forwards(&self) {
        if let Tables::Fallback(f) = self.tables() {
            f.prepare_forwards();
        }
    }

    fn prepare_backwards(&self) {
        if let Tables::Fallback(f) = self.tables() {
            f.prepare_backwards();
        }
    }

    fn search_forwards(&self, array: &[u8], from: i64, to: i64) -> i64 {
        let table = match self.tables() {
            Tables::Fallback(f) => return f.search_forwards(array, from, to),
            Tables::QGram { forward, .. } => forward,
        };
        let m = self.pattern.length();
        if from > to || array.is_empty() {
            return -1;
        }
        let last_valid_start = array.len() as i64 - m as i64;
        if last_valid_start < 0 {
            return -1;
        }
        let to = to.min(last_valid_start);
        if to < from {
            return -1;
        }
        let mut s = from.max(0) as usize;
        let to = to as usize;
        while s <= to {
            let tail = &array[s + m - table.q..s + m];
            let shift = table.shift_for(tail);
            if shift == 0 {
                if self.pattern.matches_no_bounds_check(array, s) {
                    return s as i64;
                }
                s += 1;
            } else {
                s += shift;
            }
        }
        -1
    }

    fn search_backwards(&self, array: &[u8], from: i64, to: i64) -> i64 {
        let table = match self.tables() {
            Tables::Fallback(f) => return f.search_backwards(array, from, to),
            Tables::QGram { backward, .. } => backward,
        };
        let m = self.pattern.length();
        if from < to || array.is_empty() {
            return -1;
        }
        let last_valid_start = array.len() as i64 - m as i64;
        if last_valid_start < 0 {
            return -1;
        }
        let from = from.min(last_valid_start);
        if from < to {
            return -1;
        }
        let mut s = from as usize;
        let to = to.max(0) as usize;
        loop {
            let head = &array[s..s + table.q];
            let shift = table.shift_for(head);
            if shift == 0 {
                if self.pattern.matches_no_bounds_check(array, s) {
                    return s as i64;
                }
                if s == to {
                    return -1;
                }
                s -= 1;
            } else {
                if s < to + shift {
                    return -1;
                }
                s -= shift;
            }
            if s < to {
                return -1;
            }
        }
    }
}
