//! End-to-end scenarios, one per concrete case in spec.md §8.

use std::io::Read;
use std::sync::Arc;

use byteseek::cache::TempFileStreamCache;
use byteseek::error::{CacheError, Error};
use byteseek::matcher::{ByteMatcher, ByteSequenceMatcher};
use byteseek::reader::{ByteArrayReader, WindowInputStream};
use byteseek::search::{HorspoolSearcher, QGramSearcher, SequenceSearcher, ShiftOrSearcher};

#[test]
fn scenario_1_byte_sequence_search() {
    let pattern = ByteSequenceMatcher::new(b"ABCDEF".to_vec()).unwrap();
    let searcher = ShiftOrSearcher::new(pattern);
    assert_eq!(searcher.search_forwards(b"xxABCDEFyy", 0, 9), 2);
    assert!(searcher.search_forwards(b"xxABCEFFyy", 0, 9) < 0);
}

#[test]
fn scenario_2_range_matcher_and_inversion() {
    let digits = ByteMatcher::range(0x30, 0x39);
    assert!(digits.matches(b'5'));
    assert!(!digits.matches(b'a'));

    let not_digits = ByteMatcher::range_inverted(0x30, 0x39);
    assert!(!not_digits.matches(b'5'));
    assert!(not_digits.matches(b'a'));
}

#[test]
fn scenario_3_wild_bit_any_high_nibble() {
    let m = ByteMatcher::wild_bit_any(0xF0, 0xF0);
    for b in 0u16..256 {
        let b = b as u8;
        let high_nibble_nonzero = (b & 0xF0) != 0;
        assert_eq!(m.matches(b), high_nibble_nonzero, "byte {b:#04x}");
    }
}

#[test]
fn scenario_4_mark_skip_reset_across_window_sizes() {
    for window_size in [32usize, 127, 512, 1024, 4096] {
        let data: Arc<[u8]> = Arc::from((0u16..1024).map(|b| b as u8).collect::<Vec<u8>>());
        let mut stream = WindowInputStream::new(ByteArrayReader::new(data, window_size));

        let mut first = [0u8; 1];
        stream.read_exact(&mut first).unwrap();
        stream.mark(0);
        stream.skip(500).unwrap();
        stream.reset().unwrap();

        let mut next = [0u8; 1];
        stream.read_exact(&mut next).unwrap();
        assert_eq!(next[0], first[0].wrapping_add(1), "window_size {window_size}");
    }
}

#[test]
fn scenario_5_temp_file_stream_cache_gap_and_clear() {
    let mut cache = TempFileStreamCache::new(4096);
    let window = |pos: u64| {
        byteseek::window::Window::hard(pos, 4096, Arc::from(vec![0u8; 4096].into_boxed_slice()))
    };

    use byteseek::cache::WindowCache;
    cache.add_window(window(0)).unwrap();
    cache.add_window(window(4096)).unwrap();
    cache.add_window(window(8192)).unwrap();

    let err = cache.add_window(window(16384)).unwrap_err();
    assert!(matches!(err, Error::Cache(CacheError::NonSequentialWindow { .. })));

    assert!(cache.get_window(0).is_some());
    cache.clear().unwrap();
    assert!(cache.get_window(0).is_none());
}

#[test]
fn scenario_6_one_byte_pattern_falls_back_to_shift_or() {
    let mut data = vec![b'.'; 10_240];
    data[17] = b'X';
    data[10_100] = b'X';

    let pattern = ByteSequenceMatcher::new(b"X".to_vec()).unwrap();
    let searcher = QGramSearcher::new(pattern, 4);

    assert_eq!(searcher.search_forwards(&data, 0, data.len() as i64 - 1), 17);
    assert_eq!(
        searcher.search_backwards(&data, data.len() as i64 - 1, 0),
        10_100
    );
}

#[test]
fn every_searcher_agrees_on_the_same_pattern() {
    let mut data = vec![b'.'; 2000];
    data[37..37 + 9].copy_from_slice(b"needle123");
    data[1500..1500 + 9].copy_from_slice(b"needle123");

    let shift_or = ShiftOrSearcher::new(ByteSequenceMatcher::new(b"needle123".to_vec()).unwrap());
    let horspool = HorspoolSearcher::new(ByteSequenceMatcher::new(b"needle123".to_vec()).unwrap());
    let qgram = QGramSearcher::new(ByteSequenceMatcher::new(b"needle123".to_vec()).unwrap(), 3);

    let to = data.len() as i64 - 1;
    for searcher in [&shift_or as &dyn SequenceSearcher, &horspool, &qgram] {
        assert_eq!(searcher.search_forwards(&data, 0, to), 37);
        assert_eq!(searcher.search_backwards(&data, to, 0), 1500);
    }
}

#[test]
fn reader_driven_search_finds_match_across_windows() {
    let mut data = vec![b'.'; 50];
    data[20..26].copy_from_slice(b"needle");
    let array: Arc<[u8]> = Arc::from(data.as_slice());
    let mut reader = ByteArrayReader::new(array, 7); // forces the match to straddle windows

    let searcher = ShiftOrSearcher::new(ByteSequenceMatcher::new(b"needle".to_vec()).unwrap());
    let found = searcher.search_forwards_reader(&mut reader, 0, 49).unwrap();
    assert_eq!(found, 20);
}
