//! Boyer-Moore-Horspool search over a literal byte pattern: a bad-character
//! shift table lets the scan skip ahead by more than one byte per
//! comparison, unlike the byte-at-a-time bit-parallel scan in
//! [`super::ShiftOrSearcher`].

use once_cell::sync::OnceCell;

use crate::matcher::{ByteSequenceMatcher, SequenceMatcher};

use super::SequenceSearcher;

/// `shift[c]` = how far the window can safely advance when its last byte
/// is `c` and no match was found, built from the rightmost occurrence of
/// `c` in the pattern excluding its own last byte.
struct ShiftTable([usize; 256]);

impl ShiftTable {
    fn forward(pattern: &[u8]) -> Self {
        let m = pattern.len();
        let mut shift = [m; 256];
        for (i, &b) in pattern[..m - 1].iter().enumerate() {
            shift[b as usize] = m - 1 - i;
        }
        ShiftTable(shift)
    }

    /// Mirrors `forward`, built from the leftmost occurrence of `c` in the
    /// pattern excluding its own first byte, for scanning right to left.
    fn backward(pattern: &[u8]) -> Self {
        let m = pattern.len();
        let mut shift = [m; 256];
        for i in (1..m).rev() {
            shift[pattern[i] as usize] = i;
        }
        ShiftTable(shift)
    }
}

pub struct HorspoolSearcher {
    pattern: ByteSequenceMatcher,
    forward: OnceCell<ShiftTable>,
    backward: OnceCell<ShiftTable>,
}

impl HorspoolSearcher {
    pub fn new(pattern: ByteSequenceMatcher) -> Self {
        HorspoolSearcher { pattern, forward: OnceCell::new(), backward: OnceCell::new() }
    }

    fn forward_table(&self) -> &ShiftTable {
        self.forward.get_or_init(|| ShiftTable::forward(self.pattern.as_bytes()))
    }

    fn backward_table(&self) -> &ShiftTable {
        self.backward.get_or_init(|| ShiftTable::backward(self.pattern.as_bytes()))
    }
}

impl SequenceSearcher for HorspoolSearcher {
    fn pattern(&self) -> &ByteSequenceMatcher {
        &self.pattern
    }

    fn prepare_forwards(&self) {
        self.forward_table();
    }

    fn prepare_backwards(&self) {
        self.backward_table();
    }

    fn search_forwards(&self, array: &[u8], from: i64, to: i64) -> i64 {
        let m = self.pattern.length();
        if from > to || array.is_empty() || m == 0 {
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
        let table = self.forward_table();
        let mut s = from.max(0) as usize;
        let to = to as usize;
        while s <= to {
            if self.pattern.matches_no_bounds_check(array, s) {
                return s as i64;
            }
            let last = array[s + m - 1];
            s += table.0[last as usize];
        }
        -1
    }

    fn search_backwards(&self, array: &[u8], from: i64, to: i64) -> i64 {
        let m = self.pattern.length();
        if from < to || array.is_empty() || m == 0 {
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
        let table = self.backward_table();
        let mut s = from as usize;
        let to = to.max(0) as usize;
        loop {
            if self.pattern.matches_no_bounds_check(array, s) {
                return s as i64;
            }
            let first = array[s];
            let shift = table.0[first as usize].max(1);
            if s < to + shift {
                return -1;
            }
            s -= shift;
            if s < to {
                return -1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searcher(pattern: &[u8]) -> HorspoolSearcher {
        HorspoolSearcher::new(ByteSequenceMatcher::new(pattern.to_vec()).unwrap())
    }

    #[test]
    fn finds_first_forward_match() {
        let s = searcher(b"ABCDEF");
        assert_eq!(s.search_forwards(b"xxABCDEFyy", 0, 9), 2);
        assert_eq!(s.search_forwards(b"xxABCEFFyy", 0, 9), -1);
    }

    #[test]
    fn finds_last_backward_match() {
        let s = searcher(b"AB");
        assert_eq!(s.search_backwards(b"xABxxABx", 7, 0), 5);
        assert_eq!(s.search_backwards(b"xABxxABx", 4, 0), 1);
    }

    #[test]
    fn skips_ahead_using_the_bad_character_table() {
        let s = searcher(b"NEEDLE");
        let mut haystack = vec![b'.'; 5000];
        haystack.extend_from_slice(b"NEEDLE");
        haystack.extend(vec![b'.'; 100]);
        assert_eq!(s.search_forwards(&haystack, 0, haystack.len() as i64 - 1), 5000);
    }

    #[test]
    fn repeated_byte_pattern_is_found() {
        let s = searcher(b"AAA");
        assert_eq!(s.search_forwards(b"xxAAAxx", 0, 6), 2);
    }
}
