//! A reader over a filesystem file, using `Read + Seek` rather than
//! memory-mapping — a window must be independently soft-reclaimable, which
//! a mapped page is not without extra unsafety this crate has no need for.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use super::{aligned_position, WindowReader};
use crate::cache::{LeastRecentlyUsedCache, WindowCache};
use crate::error::{Error, Result, StateError};
use crate::window::Window;

const DEFAULT_CACHE_WINDOWS: usize = 64;

pub struct FileReader {
    file: Option<File>,
    length: u64,
    window_size: usize,
    cache: Box<dyn WindowCache>,
}

impl FileReader {
    pub fn open(path: impl AsRef<Path>, window_size: usize) -> Result<Self> {
        let cache = Box::new(LeastRecentlyUsedCache::new(
            NonZeroUsize::new(DEFAULT_CACHE_WINDOWS).unwrap(),
        ));
        Self::with_cache(path, window_size, cache)
    }

    pub fn with_cache(
        path: impl AsRef<Path>,
        window_size: usize,
        cache: Box<dyn WindowCache>,
    ) -> Result<Self> {
        assert!(window_size > 0, "window size must be positive");
        let file = File::open(path)?;
        let length = file.metadata()?.len();
        Ok(FileReader { file: Some(file), length, window_size, cache })
    }
}

impl WindowReader for FileReader {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn get_window(&mut self, position: u64) -> Result<Option<Window>> {
        let Some(file) = self.file.as_mut() else {
            return Err(Error::State(StateError::ReaderClosed));
        };
        if position >= self.length {
            return Ok(None);
        }
        let aligned = aligned_position(position, self.window_size);
        if let Some(window) = self.cache.get_window(aligned) {
            return Ok(Some(window));
        }
        file.seek(SeekFrom::Start(aligned))?;
        let remaining = self.length - aligned;
        let to_read = remaining.min(self.window_size as u64) as usize;
        let mut buf = vec![0u8; to_read];
        file.read_exact(&mut buf)?;
        let window = Window::hard(aligned, to_read, Arc::from(buf.into_boxed_slice()));
        self.cache.add_window(window.clone())?;
        Ok(Some(window))
    }

    fn length(&mut self) -> Result<u64> {
        Ok(self.length)
    }

    fn close(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }
}
