//! A reader over an in-memory byte array. Every window is trivially
//! re-derivable from the array, so a miss is never more than a slice copy.

use std::sync::Arc;

use super::{aligned_position, WindowReader};
use crate::cache::{AllCache, WindowCache};
use crate::error::{Error, Result, StateError};
use crate::window::Window;

pub struct ByteArrayReader {
    array: Arc<[u8]>,
    window_size: usize,
    cache: Box<dyn WindowCache>,
    closed: bool,
}

impl ByteArrayReader {
    /// Backed by an always-cache-all strategy: the whole array is already
    /// resident, so there is nothing to evict.
    pub fn new(array: Arc<[u8]>, window_size: usize) -> Self {
        Self::with_cache(array, window_size, Box::new(AllCache::new()))
    }

    pub fn with_cache(array: Arc<[u8]>, window_size: usize, cache: Box<dyn WindowCache>) -> Self {
        assert!(window_size > 0, "window size must be positive");
        ByteArrayReader { array, window_size, cache, closed: false }
    }
}

impl WindowReader for ByteArrayReader {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn get_window(&mut self, position: u64) -> Result<Option<Window>> {
        if self.closed {
            return Err(Error::State(StateError::ReaderClosed));
        }
        let len = self.array.len() as u64;
        if position >= len {
            return Ok(None);
        }
        let aligned = aligned_position(position, self.window_size);
        if let Some(window) = self.cache.get_window(aligned) {
            return Ok(Some(window));
        }
        let end = (aligned + self.window_size as u64).min(len);
        let slice = &self.array[aligned as usize..end as usize];
        let window = Window::hard(aligned, slice.len(), Arc::from(slice.to_vec().into_boxed_slice()));
        self.cache.add_window(window.clone())?;
        Ok(Some(window))
    }

    fn length(&mut self) -> Result<u64> {
        Ok(self.array.len() as u64)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_bytes_aligned_to_window_boundaries() {
        let data: Arc<[u8]> = Arc::from(&b"0123456789"[..]);
        let mut reader = ByteArrayReader::new(data, 4);
        let w = reader.get_window(5).unwrap().unwrap();
        assert_eq!(w.position(), 4);
        assert_eq!(w.length(), 4);
        assert_eq!(reader.get_byte(5).unwrap(), Some(b'5'));
    }

    #[test]
    fn final_window_is_short() {
        let data: Arc<[u8]> = Arc::from(&b"0123456789"[..]);
        let mut reader = ByteArrayReader::new(data, 4);
        let w = reader.get_window(8).unwrap().unwrap();
        assert_eq!(w.position(), 8);
        assert_eq!(w.length(), 2);
    }

    #[test]
    fn read_spans_multiple_windows() {
        let data: Arc<[u8]> = Arc::from(&b"0123456789"[..]);
        let mut reader = ByteArrayReader::new(data, 4);
        let mut buf = [0u8; 6];
        let n = reader.read(2, &mut buf).unwrap();
        assert_eq!(n, 6);
        assert_eq!(&buf, b"234567");
    }

    #[test]
    fn past_end_of_source_yields_none() {
        let data: Arc<[u8]> = Arc::from(&b"abcd"[..]);
        let mut reader = ByteArrayReader::new(data, 4);
        assert!(reader.get_window(4).unwrap().is_none());
        assert_eq!(reader.get_byte(4).unwrap(), None);
    }

    #[test]
    fn closed_reader_errors() {
        let data: Arc<[u8]> = Arc::from(&b"abcd"[..]);
        let mut reader = ByteArrayReader::new(data, 4);
        reader.close().unwrap();
        assert!(matches!(
            reader.get_window(0),
            Err(Error::State(StateError::ReaderClosed))
        ));
    }
}
