//! Windowed, random-access byte sources.
//!
//! A [`WindowReader`] divides a byte origin (an in-memory array, a file, a
//! forward-only stream) into fixed-size windows and serves them through an
//! attached [`crate::cache::WindowCache`]. Implementors only need to supply
//! how a window is produced on a cache miss; `get_byte` and `read` are
//! built once here in terms of `get_window`, the way `campross`'s
//! `bitfile::BitReader<R>` builds bit-level reads on top of a single
//! byte-level primitive.

mod array;
mod file;
mod input_stream;
mod seekable;
mod stream;

pub use array::ByteArrayReader;
pub use file::FileReader;
pub use input_stream::{MarkReset, WindowInputStream};
pub use seekable::{ReaderSeekableByteChannel, SeekableByteChannel};
pub use stream::InputStreamReader;

use crate::error::Result;
use crate::window::Window;

/// A random-access, windowed view over some byte origin.
///
/// Not `Sync`: a reader is single-writer, per the crate's concurrency
/// model. Nothing here stops a reader being `Send` when its origin is.
pub trait WindowReader {
    /// The fixed size of every window except possibly the last.
    fn window_size(&self) -> usize;

    /// The window covering `position`, or `None` at end-of-source.
    /// `window.position() == position - (position % window_size())`.
    fn get_window(&mut self, position: u64) -> Result<Option<Window>>;

    /// Exact length for file/array origins; for stream origins this drains
    /// the stream if not already known (see `SPEC_FULL.md` §9 on stream
    /// reader length).
    fn length(&mut self) -> Result<u64>;

    /// Releases the origin handle. Idempotent. Does not cascade to a cache
    /// shared with other readers.
    fn close(&mut self) -> Result<()>;

    /// The byte at `position`, or `None` past end-of-source.
    fn get_byte(&mut self, position: u64) -> Result<Option<u8>> {
        match self.get_window(position)? {
            Some(window) => {
                let offset = (position - window.position()) as usize;
                window.get_byte(offset)
            }
            None => Ok(None),
        }
    }

    /// Copies bytes starting at `position` into `dst`, spanning as many
    /// windows as needed. Returns the number of bytes copied; `0` at
    /// end-of-source.
    fn read(&mut self, position: u64, dst: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        let mut pos = position;
        while total < dst.len() {
            let window = match self.get_window(pos)? {
                Some(window) => window,
                None => break,
            };
            let offset = (pos - window.position()) as usize;
            let available = window.length() - offset;
            if available == 0 {
                break;
            }
            let n = available.min(dst.len() - total);
            let array = window.array()?;
            dst[total..total + n].copy_from_slice(&array[offset..offset + n]);
            total += n;
            pos += n as u64;
        }
        Ok(total)
    }
}

/// The absolute position of the window that would contain `position`.
pub(crate) fn aligned_position(position: u64, window_size: usize) -> u64 {
    position - (position % window_size as u64)
}
