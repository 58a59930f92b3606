//! A forward `std::io::Read` view over a [`WindowReader`], with optional
//! mark/reset. Unlike a plain stream, "mark" needs no internal buffering:
//! the reader already retains windows through its cache, so `reset` is
//! just seeking the cursor back to a recorded position.

use std::io;

use super::WindowReader;
use crate::error::{Error, StateError};

/// Mark/reset support `std::io::Read` does not provide on its own.
pub trait MarkReset {
    fn mark_supported(&self) -> bool;

    /// Records the current position. `read_ahead_limit` is accepted for
    /// API familiarity but ignored — there is no buffer to exhaust, since
    /// [`WindowReader::get_window`] already keeps windows addressable
    /// through its cache.
    fn mark(&mut self, read_ahead_limit: usize);

    fn reset(&mut self) -> crate::error::Result<()>;
}

fn to_io_error(err: Error) -> io::Error {
    match err {
        Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

pub struct WindowInputStream<R> {
    reader: R,
    position: u64,
    mark_supported: bool,
    mark_position: Option<u64>,
    close_reader_on_close: bool,
    closed: bool,
}

impl<R: WindowReader> WindowInputStream<R> {
    pub fn new(reader: R) -> Self {
        WindowInputStream {
            reader,
            position: 0,
            mark_supported: true,
            mark_position: None,
            close_reader_on_close: false,
            closed: false,
        }
    }

    pub fn mark_supported_flag(mut self, supported: bool) -> Self {
        self.mark_supported = supported;
        self
    }

    /// When set, closing this stream also closes the underlying reader.
    /// Off by default: a reader's cache may be shared with other readers
    /// or otherwise outlive this particular stream view.
    pub fn close_reader_on_close(mut self, close: bool) -> Self {
        self.close_reader_on_close = close;
        self
    }

    /// Bytes between the current position and end-of-source. May block
    /// draining the origin on a stream reader whose length is not yet
    /// known.
    pub fn available(&mut self) -> io::Result<usize> {
        let len = self.reader.length().map_err(to_io_error)?;
        Ok(len.saturating_sub(self.position).min(usize::MAX as u64) as usize)
    }

    /// Advances the position by up to `count` bytes without reading them,
    /// clipped to what remains. A negative or past-end request yields 0.
    pub fn skip(&mut self, count: i64) -> io::Result<u64> {
        if count <= 0 {
            return Ok(0);
        }
        let len = self.reader.length().map_err(to_io_error)?;
        let remaining = len.saturating_sub(self.position);
        let advance = remaining.min(count as u64);
        self.position += advance;
        Ok(advance)
    }

    pub fn close(&mut self) -> crate::error::Result<()> {
        self.closed = true;
        if self.close_reader_on_close {
            self.reader.close()?;
        }
        Ok(())
    }
}

impl<R: WindowReader> io::Read for WindowInputStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::Other, "stream is closed"));
        }
        let n = self.reader.read(self.position, buf).map_err(to_io_error)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<R: WindowReader> MarkReset for WindowInputStream<R> {
    fn mark_supported(&self) -> bool {
        self.mark_supported
    }

    fn mark(&mut self, _read_ahead_limit: usize) {
        if self.mark_supported {
            self.mark_position = Some(self.position);
        }
    }

    fn reset(&mut self) -> crate::error::Result<()> {
        if !self.mark_supported {
            return Err(Error::State(StateError::MarkNotSupported));
        }
        match self.mark_position {
            Some(pos) => {
                self.position = pos;
                Ok(())
            }
            None => Err(Error::State(StateError::NoMarkSet)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteArrayReader;
    use std::io::Read;
    use std::sync::Arc;

    fn stream() -> WindowInputStream<ByteArrayReader> {
        let data: Arc<[u8]> = Arc::from((0u16..1024).map(|b| b as u8).collect::<Vec<u8>>());
        WindowInputStream::new(ByteArrayReader::new(data, 127))
    }

    #[test]
    fn mark_skip_reset_returns_to_the_marked_position() {
        for window_size in [32usize, 127, 512, 1024, 4096] {
            let data: Arc<[u8]> = Arc::from((0u16..1024).map(|b| b as u8).collect::<Vec<u8>>());
            let mut s = WindowInputStream::new(ByteArrayReader::new(data, window_size));
            let mut first_byte = [0u8; 1];
            s.read_exact(&mut first_byte).unwrap();
            s.mark(0);
            s.skip(500).unwrap();
            s.reset().unwrap();
            let mut next = [0u8; 1];
            s.read_exact(&mut next).unwrap();
            assert_eq!(next[0], first_byte[0].wrapping_add(1));
        }
    }

    #[test]
    fn reset_without_mark_fails() {
        let mut s = stream();
        assert!(matches!(s.reset(), Err(Error::State(StateError::NoMarkSet))));
    }

    #[test]
    fn reset_when_unsupported_fails() {
        let mut s = stream().mark_supported_flag(false);
        s.mark(10);
        assert!(matches!(s.reset(), Err(Error::State(StateError::MarkNotSupported))));
    }

    #[test]
    fn skip_clips_to_negative_and_past_end() {
        let mut s = stream();
        assert_eq!(s.skip(-5).unwrap(), 0);
        assert_eq!(s.skip(2000).unwrap(), 1024);
        assert_eq!(s.skip(10).unwrap(), 0);
    }

    #[test]
    fn close_does_not_close_reader_unless_requested() {
        let mut s = stream();
        s.close().unwrap();
        let mut buf = [0u8; 1];
        assert!(s.read(&mut buf).is_err());
    }
}
