//! A read-only seekable-channel view over a [`WindowReader`].
//!
//! Rust's standard library has no NIO-style seekable-channel trait, so this
//! is a small local one. Defining `write`/`set_len` here (rather than
//! implementing `std::io::Write`) lets both always fail with "not
//! writable" instead of the type simply lacking a `Write` impl — the
//! spec calls for a channel that reports itself as unwritable, not one a
//! caller merely fails to find a writer for.

use super::WindowReader;
use crate::error::{Error, Result, StateError};

pub trait SeekableByteChannel {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Always fails with [`StateError::NotWritable`]; this crate never
    /// mutates the underlying source (spec.md §1 Non-goals).
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    fn position(&self) -> u64;

    fn set_position(&mut self, position: u64) -> Result<()>;

    fn size(&mut self) -> Result<u64>;

    /// Always fails with [`StateError::NotWritable`].
    fn set_len(&mut self, size: u64) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Marks the channel closed without closing the underlying reader.
    fn close(&mut self);
}

/// The default, and only, implementation: a read-only view over a single
/// [`WindowReader`].
pub struct ReaderSeekableByteChannel<R> {
    reader: R,
    position: u64,
    closed: bool,
}

impl<R: WindowReader> ReaderSeekableByteChannel<R> {
    pub fn new(reader: R) -> Self {
        ReaderSeekableByteChannel { reader, position: 0, closed: false }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::State(StateError::ChannelClosed))
        } else {
            Ok(())
        }
    }
}

impl<R: WindowReader> SeekableByteChannel for ReaderSeekableByteChannel<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_open()?;
        let n = self.reader.read(self.position, buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::State(StateError::NotWritable))
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        self.check_open()?;
        self.position = position;
        Ok(())
    }

    fn size(&mut self) -> Result<u64> {
        self.check_open()?;
        self.reader.length()
    }

    fn set_len(&mut self, _size: u64) -> Result<()> {
        Err(Error::State(StateError::NotWritable))
    }

    fn is_open(&self) -> bool {
        !self.closed
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
