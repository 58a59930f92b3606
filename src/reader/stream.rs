//! A reader over a forward-only `Read` origin. Windows are produced in
//! order as the stream is consumed; random access to a position already
//! passed is served from the cache, never by re-reading the origin.

use std::io::Read;
use std::sync::Arc;

use super::{aligned_position, WindowReader};
use crate::cache::{AllCache, WindowCache};
use crate::error::{ArgumentError, Error, Result, StateError};
use crate::window::Window;

/// Reads `buf.len()` bytes from `inner`, or fewer only at end-of-source.
fn read_fully_or_eof<R: Read>(inner: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = inner.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

pub struct InputStreamReader<R> {
    inner: Option<R>,
    window_size: usize,
    cache: Box<dyn WindowCache>,
    /// Absolute position of the next window boundary not yet produced
    /// from the origin. Equivalently, the number of bytes read so far
    /// when every produced window but the last is full-size.
    produced: u64,
    /// Set once the origin has been observed to run dry.
    length: Option<u64>,
}

impl<R: Read> InputStreamReader<R> {
    /// Retains every window it produces by default, since a forward-only
    /// origin cannot re-supply one that was evicted. Callers who know
    /// their access pattern never revisits old positions can supply a
    /// bounded cache via [`Self::with_cache`].
    pub fn new(inner: R, window_size: usize) -> Self {
        Self::with_cache(inner, window_size, Box::new(AllCache::new()))
    }

    pub fn with_cache(inner: R, window_size: usize, cache: Box<dyn WindowCache>) -> Self {
        assert!(window_size > 0, "window size must be positive");
        InputStreamReader { inner: Some(inner), window_size, cache, produced: 0, length: None }
    }

    /// Reads and caches windows from the origin until either `target` has
    /// been produced or the origin runs dry.
    fn advance_to(&mut self, target: u64) -> Result<()> {
        while self.length.is_none() && self.produced <= target {
            let inner = self.inner.as_mut().ok_or(Error::State(StateError::ReaderClosed))?;
            let mut buf = vec![0u8; self.window_size];
            let n = read_fully_or_eof(inner, &mut buf)?;
            if n == 0 {
                self.length = Some(self.produced);
                break;
            }
            let pos = self.produced;
            buf.truncate(n);
            let window = Window::hard(pos, n, Arc::from(buf.into_boxed_slice()));
            log::trace!("input-stream reader produced window at {pos} ({n} bytes)");
            self.cache.add_window(window)?;
            self.produced += n as u64;
            if n < self.window_size {
                self.length = Some(self.produced);
                break;
            }
        }
        Ok(())
    }
}

impl<R: Read> WindowReader for InputStreamReader<R> {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn get_window(&mut self, position: u64) -> Result<Option<Window>> {
        if self.inner.is_none() {
            return Err(Error::State(StateError::ReaderClosed));
        }
        if let Some(len) = self.length {
            if position >= len {
                return Ok(None);
            }
        }
        let aligned = aligned_position(position, self.window_size);
        if let Some(window) = self.cache.get_window(aligned) {
            return Ok(Some(window));
        }
        if aligned < self.produced {
            // Already produced once, but no longer in cache, and the
            // origin cannot be rewound to reproduce it.
            return Err(Error::Argument(ArgumentError::NoByteAtPosition(position)));
        }
        self.advance_to(aligned)?;
        if let Some(len) = self.length {
            if position >= len {
                return Ok(None);
            }
        }
        Ok(self.cache.get_window(aligned))
    }

    /// Drains the origin (blocking) the first time this is called, then
    /// returns the cached result on every subsequent call.
    fn length(&mut self) -> Result<u64> {
        self.advance_to(u64::MAX)?;
        Ok(self.length.expect("advance_to(u64::MAX) only returns once length is known"))
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn produces_windows_in_order() {
        let mut reader = InputStreamReader::new(Cursor::new(b"0123456789".to_vec()), 4);
        let w = reader.get_window(0).unwrap().unwrap();
        assert_eq!(&*w.array().unwrap(), b"0123");
        let w = reader.get_window(4).unwrap().unwrap();
        assert_eq!(&*w.array().unwrap(), b"4567");
    }

    #[test]
    fn random_access_ahead_advances_the_stream() {
        let mut reader = InputStreamReader::new(Cursor::new(b"0123456789".to_vec()), 4);
        let w = reader.get_window(9).unwrap().unwrap();
        assert_eq!(w.position(), 8);
        assert_eq!(w.length(), 2);
    }

    #[test]
    fn earlier_positions_are_served_from_cache() {
        let mut reader = InputStreamReader::new(Cursor::new(b"0123456789".to_vec()), 4);
        reader.get_window(8).unwrap();
        let w = reader.get_window(0).unwrap().unwrap();
        assert_eq!(&*w.array().unwrap(), b"0123");
    }

    #[test]
    fn length_drains_the_stream_once_and_caches_it() {
        let mut reader = InputStreamReader::new(Cursor::new(b"0123456789".to_vec()), 4);
        assert_eq!(reader.length().unwrap(), 10);
        assert_eq!(reader.length().unwrap(), 10);
        assert!(reader.get_window(20).unwrap().is_none());
    }

    #[test]
    fn evicted_earlier_window_is_not_rereadable() {
        use crate::cache::LeastRecentlyUsedCache;
        use std::num::NonZeroUsize;
        let cache = Box::new(LeastRecentlyUsedCache::new(NonZeroUsize::new(1).unwrap()));
        let mut reader =
            InputStreamReader::with_cache(Cursor::new(b"0123456789".to_vec()), 4, cache);
        reader.get_window(0).unwrap();
        reader.get_window(8).unwrap(); // evicts window 0 from the size-1 cache
        let err = reader.get_window(0).unwrap_err();
        assert!(matches!(err, Error::Argument(ArgumentError::NoByteAtPosition(0))));
    }
}
