//! The byte-matcher algebra (§4.4) and the sequence matchers built on top
//! of it (§4.5): ordered, sliceable, shared-storage views that searchers
//! and readers both consume.

mod byte_matcher;
mod sequence_matcher;

pub use byte_matcher::ByteMatcher;
pub use sequence_matcher::{
    ArraySequenceMatcher, ByteSequenceMatcher, ReverseArraySequenceMatcher,
    ReverseByteArrayMatcher, SequenceMatcher,
};
