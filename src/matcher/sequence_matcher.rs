//! Ordered sequences of [`ByteMatcher`]s, with cheap (no-copy)
//! subsequence/reverse views over a shared backing array — the same
//! `(array, start, end)` slice-over-shared-buffer shape
//! `campross::window::SlidingWindow` uses for its `window_slice`/
//! `lookahead_slice` views, generalized from bytes to matchers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::ByteMatcher;
use crate::error::{ArgumentError, CompositionError, Error, Result};
use crate::reader::WindowReader;

fn content_hash_of(bytes: impl Hash) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut h = DefaultHasher::new();
    bytes.hash(&mut h);
    h.finish()
}

fn check_subrange(begin: usize, end: usize, length: usize) -> Result<()> {
    if begin > end || end > length {
        return Err(Error::Argument(ArgumentError::IndexOutOfBounds {
            index: end as i64,
            length,
        }));
    }
    Ok(())
}

/// An ordered sequence of byte-matchers, one per position. Implemented by
/// [`ArraySequenceMatcher`] (heterogeneous matchers), [`ByteSequenceMatcher`]
/// (the specialized all-literal case), and [`ReverseByteArrayMatcher`] (a
/// reversed view of the latter).
pub trait SequenceMatcher: fmt::Debug {
    fn length(&self) -> usize;

    fn matcher_at(&self, index: usize) -> ByteMatcher;

    /// Bounds-checked: `pos + length() <= array.len()`.
    fn matches(&self, array: &[u8], pos: usize) -> Result<bool> {
        if pos.checked_add(self.length()).map_or(true, |end| end > array.len()) {
            return Err(Error::Argument(ArgumentError::IndexOutOfBounds {
                index: pos as i64,
                length: array.len(),
            }));
        }
        Ok(self.matches_no_bounds_check(array, pos))
    }

    /// Precondition: `pos + length() <= array.len() && pos >= 0`. Only
    /// call this from a loop that has already established the bound.
    fn matches_no_bounds_check(&self, array: &[u8], pos: usize) -> bool {
        (0..self.length()).all(|i| self.matcher_at(i).matches(array[pos + i]))
    }

    /// Crosses window boundaries transparently; `false` (no match) if the
    /// reader runs dry before `length()` bytes have been consumed.
    fn matches_reader(&self, reader: &mut dyn WindowReader, pos: u64) -> Result<bool> {
        for i in 0..self.length() {
            let Some(b) = reader.get_byte(pos + i as u64)? else {
                return Ok(false);
            };
            if !self.matcher_at(i).matches(b) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// The general case: a sequence of possibly-heterogeneous [`ByteMatcher`]s.
#[derive(Clone)]
pub struct ArraySequenceMatcher {
    matchers: Arc<[ByteMatcher]>,
    start: usize,
    end: usize,
    hash: Arc<OnceCell<u64>>,
}

impl ArraySequenceMatcher {
    pub fn new(matchers: Vec<ByteMatcher>) -> Result<Self> {
        if matchers.is_empty() {
            return Err(Error::Argument(ArgumentError::EmptyArray));
        }
        let end = matchers.len();
        Ok(ArraySequenceMatcher {
            matchers: Arc::from(matchers),
            start: 0,
            end,
            hash: Arc::new(OnceCell::new()),
        })
    }

    fn view(&self, start: usize, end: usize) -> Self {
        ArraySequenceMatcher {
            matchers: self.matchers.clone(),
            start,
            end,
            hash: Arc::new(OnceCell::new()),
        }
    }

    fn slice(&self) -> &[ByteMatcher] {
        &self.matchers[self.start..self.end]
    }

    /// A no-copy view of `[begin, end)`. Returns the same instance when
    /// the range covers the whole sequence.
    pub fn subsequence(&self, begin: usize, end: usize) -> Result<Self> {
        check_subrange(begin, end, self.length())?;
        if begin == 0 && end == self.length() {
            return Ok(self.clone());
        }
        Ok(self.view(self.start + begin, self.start + end))
    }

    pub fn reverse(&self) -> ReverseArraySequenceMatcher {
        ReverseArraySequenceMatcher { inner: self.clone() }
    }

    /// Copies the backing array `n` times; unlike subsequence/reverse this
    /// cannot be a view.
    pub fn repeat(&self, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::Argument(ArgumentError::NonPositiveCount(0)));
        }
        let mut out = Vec::with_capacity(self.length() * n);
        for _ in 0..n {
            out.extend_from_slice(self.slice());
        }
        Self::new(out)
    }

    pub fn content_hash(&self) -> u64 {
        *self.hash.get_or_init(|| content_hash_of(self.slice()))
    }
}

impl fmt::Debug for ArraySequenceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.slice()).finish()
    }
}

impl PartialEq for ArraySequenceMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.slice() == other.slice()
    }
}
impl Eq for ArraySequenceMatcher {}

impl Hash for ArraySequenceMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl SequenceMatcher for ArraySequenceMatcher {
    fn length(&self) -> usize {
        self.end - self.start
    }

    fn matcher_at(&self, index: usize) -> ByteMatcher {
        self.slice()[index]
    }
}

/// A reversed, no-copy view over an [`ArraySequenceMatcher`]'s backing
/// array.
#[derive(Clone)]
pub struct ReverseArraySequenceMatcher {
    inner: ArraySequenceMatcher,
}

impl ReverseArraySequenceMatcher {
    /// `reverse().reverse()` yields back the original (structurally equal)
    /// matcher, at no copying cost.
    pub fn reverse(&self) -> ArraySequenceMatcher {
        self.inner.clone()
    }
}

impl fmt::Debug for ReverseArraySequenceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries((0..self.length()).map(|i| self.matcher_at(i))).finish()
    }
}

impl SequenceMatcher for ReverseArraySequenceMatcher {
    fn length(&self) -> usize {
        self.inner.length()
    }

    fn matcher_at(&self, index: usize) -> ByteMatcher {
        self.inner.matcher_at(self.length() - 1 - index)
    }
}

/// The specialized case where every position matches exactly one byte:
/// stores the literal bytes directly rather than a `ByteMatcher` per
/// position, so search algorithms can work on plain byte comparisons.
#[derive(Clone)]
pub struct ByteSequenceMatcher {
    bytes: Arc<[u8]>,
    start: usize,
    end: usize,
    hash: Arc<OnceCell<u64>>,
}

impl ByteSequenceMatcher {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Error::Argument(ArgumentError::EmptyArray));
        }
        let end = bytes.len();
        Ok(ByteSequenceMatcher { bytes, start: 0, end, hash: Arc::new(OnceCell::new()) })
    }

    pub fn from_ascii(s: &str) -> Result<Self> {
        Self::new(s.as_bytes().to_vec())
    }

    fn view(&self, start: usize, end: usize) -> Self {
        ByteSequenceMatcher { bytes: self.bytes.clone(), start, end, hash: Arc::new(OnceCell::new()) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[self.start..self.end]
    }

    /// A no-copy view of `[begin, end)`. If the resulting length is 1 the
    /// caller should generally prefer a single [`ByteMatcher::one_byte`];
    /// this method stays a `ByteSequenceMatcher` of length 1 so callers
    /// that need the `SequenceMatcher` interface do not have to branch.
    pub fn subsequence(&self, begin: usize, end: usize) -> Result<Self> {
        check_subrange(begin, end, self.length())?;
        if begin == 0 && end == self.length() {
            return Ok(self.clone());
        }
        Ok(self.view(self.start + begin, self.start + end))
    }

    pub fn reverse(&self) -> ReverseByteArrayMatcher {
        ReverseByteArrayMatcher { inner: self.clone() }
    }

    pub fn repeat(&self, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::Argument(ArgumentError::NonPositiveCount(0)));
        }
        let mut out = Vec::with_capacity(self.length() * n);
        for _ in 0..n {
            out.extend_from_slice(self.as_bytes());
        }
        Self::new(out)
    }

    pub fn content_hash(&self) -> u64 {
        *self.hash.get_or_init(|| content_hash_of(self.as_bytes()))
    }
}

impl fmt::Debug for ByteSequenceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSequenceMatcher({:?})", self.as_bytes())
    }
}

impl PartialEq for ByteSequenceMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
impl Eq for ByteSequenceMatcher {}

impl Hash for ByteSequenceMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl SequenceMatcher for ByteSequenceMatcher {
    fn length(&self) -> usize {
        self.end - self.start
    }

    fn matcher_at(&self, index: usize) -> ByteMatcher {
        ByteMatcher::one_byte(self.as_bytes()[index])
    }

    fn matches_no_bounds_check(&self, array: &[u8], pos: usize) -> bool {
        array[pos..pos + self.length()] == *self.as_bytes()
    }
}

/// Building a `ByteSequenceMatcher` from a general sequence is only valid
/// if every position is exactly one byte.
impl TryFrom<&ArraySequenceMatcher> for ByteSequenceMatcher {
    type Error = Error;

    fn try_from(value: &ArraySequenceMatcher) -> Result<Self> {
        let mut bytes = Vec::with_capacity(value.length());
        for i in 0..value.length() {
            match value.matcher_at(i) {
                ByteMatcher::OneByte(b) => bytes.push(b),
                _ => return Err(Error::Composition(CompositionError::NotAByteSequence(i))),
            }
        }
        ByteSequenceMatcher::new(bytes)
    }
}

/// A reversed, no-copy view over a [`ByteSequenceMatcher`]'s backing
/// array.
#[derive(Clone)]
pub struct ReverseByteArrayMatcher {
    inner: ByteSequenceMatcher,
}

impl ReverseByteArrayMatcher {
    pub fn reverse(&self) -> ByteSequenceMatcher {
        self.inner.clone()
    }

    /// The reversed bytes, materialized. Search algorithms that need a
    /// literal backward pattern (rather than index flipping per byte) use
    /// this once at preparation time.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.as_bytes().iter().rev().copied().collect()
    }
}

impl fmt::Debug for ReverseByteArrayMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReverseByteArrayMatcher({:?})", self.to_bytes())
    }
}

impl SequenceMatcher for ReverseByteArrayMatcher {
    fn length(&self) -> usize {
        self.inner.length()
    }

    fn matcher_at(&self, index: usize) -> ByteMatcher {
        self.inner.matcher_at(self.length() - 1 - index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn bsm(s: &[u8]) -> ByteSequenceMatcher {
        ByteSequenceMatcher::new(s.to_vec()).unwrap()
    }

    #[test]
    fn matches_agrees_position_by_position() {
        let m = bsm(b"ABCDEF");
        assert!(m.matches(b"xxABCDEFyy", 2).unwrap());
        assert!(!m.matches(b"xxABCEFFyy", 2).unwrap());
    }

    #[test]
    fn subsequence_of_whole_range_is_the_same_content() {
        let m = bsm(b"hello world");
        let whole = m.subsequence(0, m.length()).unwrap();
        assert_eq!(m, whole);
    }

    #[test]
    fn subsequence_composition() {
        let m = bsm(b"0123456789");
        let a = m.subsequence(2, 8).unwrap(); // "234567"
        let b = a.subsequence(1, 4).unwrap(); // "456"
        let direct = m.subsequence(3, 6).unwrap();
        assert_eq!(b, direct);
        assert_eq!(b.as_bytes(), b"345");
    }

    #[test]
    fn reverse_is_involutive() {
        let m = bsm(b"abcdef");
        assert_eq!(m.reverse().reverse(), m);
        assert_eq!(m.reverse().to_bytes(), b"fedcba");
    }

    #[test]
    fn try_from_rejects_non_literal_position() {
        let seq = ArraySequenceMatcher::new(vec![
            ByteMatcher::one_byte(b'a'),
            ByteMatcher::range(b'0', b'9'),
        ])
        .unwrap();
        let err = ByteSequenceMatcher::try_from(&seq).unwrap_err();
        assert!(matches!(err, Error::Composition(CompositionError::NotAByteSequence(1))));
    }

    #[test]
    fn try_from_accepts_all_literal_sequence() {
        let seq =
            ArraySequenceMatcher::new(vec![ByteMatcher::one_byte(b'a'), ByteMatcher::one_byte(b'b')])
                .unwrap();
        let bsm = ByteSequenceMatcher::try_from(&seq).unwrap();
        assert_eq!(bsm.as_bytes(), b"ab");
    }

    #[test]
    fn matches_reader_stops_cleanly_at_end_of_source() {
        use crate::reader::{ByteArrayReader, WindowReader};
        use std::sync::Arc as StdArc;
        let data: StdArc<[u8]> = StdArc::from(&b"abcd"[..]);
        let mut reader = ByteArrayReader::new(data, 4);
        let m = bsm(b"cdef");
        assert!(!m.matches_reader(&mut reader, 0).unwrap());
    }

    proptest! {
        #[test]
        fn subsequence_composition_holds(
            bytes in proptest::collection::vec(any::<u8>(), 1..40),
            a in 0usize..10, rel_len1 in 1usize..20, c in 0usize..10, rel_len2 in 1usize..20,
        ) {
            let m = ByteSequenceMatcher::new(bytes.clone()).unwrap();
            let a = a.min(m.length().saturating_sub(1));
            let b = (a + rel_len1).min(m.length());
            prop_assume!(b > a);
            let outer = m.subsequence(a, b).unwrap();
            let c = c.min(outer.length().saturating_sub(1));
            let d = (c + rel_len2).min(outer.length());
            prop_assume!(d > c);
            let inner = outer.subsequence(c, d).unwrap();
            let direct = m.subsequence(a + c, a + d).unwrap();
            prop_assert_eq!(inner, direct);
        }

        #[test]
        fn reverse_reverse_is_identity(bytes in proptest::collection::vec(any::<u8>(), 1..40)) {
            let m = ByteSequenceMatcher::new(bytes).unwrap();
            prop_assert_eq!(m.reverse().reverse(), m);
        }
    }
}
