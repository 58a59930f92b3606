//! The byte-matcher algebra: position-by-position predicates over a single
//! byte. Every variant is `Copy` — a 256-bit set fits in four `u64`s, so
//! there is no heap allocation anywhere in this file, the same "mask and
//! shift, never allocate" style `campross::bitfile` uses for its bit-level
//! reasoning.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{ArgumentError, Error, Result};
use crate::reader::WindowReader;

/// A 256-bit membership set, stored as four 64-bit words.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Bitset256([u64; 4]);

impl Bitset256 {
    const fn empty() -> Self {
        Bitset256([0; 4])
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self::empty();
        for &b in bytes {
            set.insert(b);
        }
        set
    }

    fn insert(&mut self, byte: u8) {
        self.0[(byte >> 6) as usize] |= 1u64 << (byte & 0x3f);
    }

    fn contains(&self, byte: u8) -> bool {
        (self.0[(byte >> 6) as usize] >> (byte & 0x3f)) & 1 != 0
    }

    fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u16..=255).filter_map(move |b| self.contains(b as u8).then_some(b as u8))
    }
}

impl fmt::Debug for Bitset256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Position-by-position predicate over one byte: `matches(b) ⇔ b ∈ S` for
/// some set `S ⊆ {0..255}`. Every variant is immutable and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteMatcher {
    OneByte(u8),
    Range { lo: u8, hi: u8, inverted: bool },
    Set { bits: Bitset256, inverted: bool },
    AllBitmask { mask: u8, inverted: bool },
    AnyBitmask { mask: u8, inverted: bool },
    WildBitAll { value: u8, wild_mask: u8 },
    WildBitAny { value: u8, wild_mask: u8, inverted: bool },
    Any,
}

/// The 256 `OneByte` matchers, built once. Since `ByteMatcher` is `Copy`,
/// interning does not give shared identity — it gives identical
/// construction, which is what the content-based equality this crate uses
/// throughout actually needs (spec.md §4.5's "equality is content-based",
/// applied consistently to single-byte matchers too).
static ONE_BYTE_TABLE: Lazy<[ByteMatcher; 256]> =
    Lazy::new(|| std::array::from_fn(|b| ByteMatcher::OneByte(b as u8)));

impl ByteMatcher {
    pub fn one_byte(b: u8) -> Self {
        ONE_BYTE_TABLE[b as usize]
    }

    /// `lo..=hi` after swapping if `lo > hi`, per spec.md §4.4's auto-swap
    /// rule; both orderings of the same pair produce the same matcher.
    pub fn range(lo: u8, hi: u8) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        ByteMatcher::Range { lo, hi, inverted: false }
    }

    pub fn range_inverted(lo: u8, hi: u8) -> Self {
        match Self::range(lo, hi) {
            ByteMatcher::Range { lo, hi, .. } => ByteMatcher::Range { lo, hi, inverted: true },
            _ => unreachable!(),
        }
    }

    pub fn set(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Argument(ArgumentError::EmptyArray));
        }
        Ok(ByteMatcher::Set { bits: Bitset256::from_bytes(bytes), inverted: false })
    }

    pub fn set_inverted(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Argument(ArgumentError::EmptyArray));
        }
        Ok(ByteMatcher::Set { bits: Bitset256::from_bytes(bytes), inverted: true })
    }

    /// Matches iff every 1-bit of `mask` is also set in the byte.
    pub fn all_bitmask(mask: u8) -> Self {
        ByteMatcher::AllBitmask { mask, inverted: false }
    }

    pub fn all_bitmask_inverted(mask: u8) -> Self {
        ByteMatcher::AllBitmask { mask, inverted: true }
    }

    /// Matches iff at least one 1-bit of `mask` is also set in the byte.
    /// A zero mask matches nothing (there is no bit to find).
    pub fn any_bitmask(mask: u8) -> Self {
        ByteMatcher::AnyBitmask { mask, inverted: false }
    }

    pub fn any_bitmask_inverted(mask: u8) -> Self {
        ByteMatcher::AnyBitmask { mask, inverted: true }
    }

    /// Matches iff the byte agrees with `value` at every bit where
    /// `wild_mask` is 1 (`wild_mask`'s 0-bits are "don't care").
    pub fn wild_bit_all(value: u8, wild_mask: u8) -> Self {
        ByteMatcher::WildBitAll { value, wild_mask }
    }

    /// Matches iff the byte agrees with `value` at *some* bit where
    /// `wild_mask` is 1. A zero mask has no bit to agree on and, per
    /// spec.md §9's design note, is defined to match every byte rather
    /// than none (vacuous existential over an empty set of care-bits is
    /// treated as "no constraint", not "impossible").
    pub fn wild_bit_any(value: u8, wild_mask: u8) -> Self {
        ByteMatcher::WildBitAny { value, wild_mask, inverted: false }
    }

    pub fn wild_bit_any_inverted(value: u8, wild_mask: u8) -> Self {
        ByteMatcher::WildBitAny { value, wild_mask, inverted: true }
    }

    pub fn any() -> Self {
        ByteMatcher::Any
    }

    pub fn matches(&self, b: u8) -> bool {
        match *self {
            ByteMatcher::OneByte(v) => b == v,
            ByteMatcher::Range { lo, hi, inverted } => (b >= lo && b <= hi) != inverted,
            ByteMatcher::Set { bits, inverted } => bits.contains(b) != inverted,
            ByteMatcher::AllBitmask { mask, inverted } => ((b & mask) == mask) != inverted,
            ByteMatcher::AnyBitmask { mask, inverted } => {
                (mask != 0 && (b & mask) != 0) != inverted
            }
            ByteMatcher::WildBitAll { value, wild_mask } => (b & wild_mask) == (value & wild_mask),
            ByteMatcher::WildBitAny { value, wild_mask, inverted } => {
                let m = wild_mask == 0 || (wild_mask & !(b ^ value)) != 0;
                m != inverted
            }
            ByteMatcher::Any => true,
        }
    }

    /// Bounds-checked: fails if `pos` is outside `array`.
    pub fn matches_array(&self, array: &[u8], pos: usize) -> Result<bool> {
        array
            .get(pos)
            .map(|&b| self.matches(b))
            .ok_or(Error::Argument(ArgumentError::IndexOutOfBounds {
                index: pos as i64,
                length: array.len(),
            }))
    }

    /// Precondition: `pos < array.len()`. Only call this inside a loop
    /// that has already established the bound, e.g. a search's inner
    /// scan window.
    pub fn matches_no_bounds_check(&self, array: &[u8], pos: usize) -> bool {
        self.matches(array[pos])
    }

    /// `false` at end-of-source, matching spec.md §3's "no match" rule for
    /// a reader that runs dry mid-sequence.
    pub fn matches_reader(&self, reader: &mut dyn WindowReader, pos: u64) -> Result<bool> {
        Ok(reader.get_byte(pos)?.is_some_and(|b| self.matches(b)))
    }

    pub fn get_matching_bytes(&self) -> Vec<u8> {
        self.matching_bytes_iter().collect()
    }

    /// A fresh, finite iterator over the matching set every time it is
    /// called — per spec.md §9's iterator contract, this does not keep
    /// state between calls.
    pub fn matching_bytes_iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u16..=255).filter_map(move |b| {
            let b = b as u8;
            self.matches(b).then_some(b)
        })
    }

    pub fn get_number_of_matching_bytes(&self) -> usize {
        match *self {
            ByteMatcher::OneByte(_) => 1,
            ByteMatcher::Range { lo, hi, inverted } => {
                let n = hi as usize - lo as usize + 1;
                if inverted {
                    256 - n
                } else {
                    n
                }
            }
            ByteMatcher::Set { bits, inverted } => {
                let n = bits.count();
                if inverted {
                    256 - n
                } else {
                    n
                }
            }
            ByteMatcher::AllBitmask { mask, inverted } => {
                let n = 1usize << mask.count_zeros();
                if inverted {
                    256 - n
                } else {
                    n
                }
            }
            ByteMatcher::AnyBitmask { mask, inverted } => {
                let n = if mask == 0 { 0 } else { 256 - (1usize << (8 - mask.count_ones())) };
                if inverted {
                    256 - n
                } else {
                    n
                }
            }
            ByteMatcher::WildBitAll { wild_mask, .. } => 1usize << (8 - wild_mask.count_ones()),
            ByteMatcher::WildBitAny { wild_mask, inverted, .. } => {
                // spec.md §9's design-note resolution of the open question:
                // |S| = 256 − 2^popcount(~wild_mask) when wild_mask != 0,
                // else 256 (a zero mask is defined to match everything).
                let n = if wild_mask == 0 {
                    256
                } else {
                    256 - (1usize << (!wild_mask).count_ones())
                };
                if inverted {
                    256 - n
                } else {
                    n
                }
            }
            ByteMatcher::Any => 256,
        }
    }

    /// Canonical textual form for diagnostics. Stable within a release,
    /// not a persisted format (spec.md §6).
    pub fn to_regular_expression(&self, pretty_print: bool) -> String {
        fn byte_repr(b: u8, pretty: bool) -> String {
            if pretty && (b.is_ascii_graphic() || b == b' ') && !br"\^$.|?*+()[]{}".contains(&b) {
                (b as char).to_string()
            } else {
                format!("\\x{b:02x}")
            }
        }
        match *self {
            ByteMatcher::OneByte(b) => byte_repr(b, pretty_print),
            ByteMatcher::Any => ".".to_string(),
            ByteMatcher::Range { lo, hi, inverted } => {
                format!("[{}{}-{}]", if inverted { "^" } else { "" }, byte_repr(lo, pretty_print), byte_repr(hi, pretty_print))
            }
            ByteMatcher::Set { bits, inverted } => {
                let body: String = bits.iter().map(|b| byte_repr(b, pretty_print)).collect();
                format!("[{}{}]", if inverted { "^" } else { "" }, body)
            }
            ByteMatcher::AllBitmask { mask, inverted } => {
                format!("{}&{mask:08b}", if inverted { "!" } else { "" })
            }
            ByteMatcher::AnyBitmask { mask, inverted } => {
                format!("{}~{mask:08b}", if inverted { "!" } else { "" })
            }
            ByteMatcher::WildBitAll { value, wild_mask } => {
                format!("{value:08b}m{wild_mask:08b}")
            }
            ByteMatcher::WildBitAny { value, wild_mask, inverted } => {
                format!("{}{value:08b}~m{wild_mask:08b}", if inverted { "!" } else { "" })
            }
        }
    }
}

/// Interned, immutable, and `Send + Sync`: safe to share across threads
/// for read-only matching, per the crate's concurrency model.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ByteMatcher>();
};
