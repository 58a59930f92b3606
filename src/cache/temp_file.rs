//! A cache that spills windows to a temporary file as a sequential,
//! write-once log: windows must be added in strictly increasing, gapless
//! position order. Returned windows are soft — their bytes can be dropped
//! and re-read from the file on demand.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use super::{CacheObserver, ObserverList, WindowCache};
use crate::error::{CacheError, Error, Result, StateError};
use crate::window::{SoftWindowRecovery, Window};

#[derive(Debug)]
struct TempFileRecovery {
    path: PathBuf,
    start_offset: u64,
}

impl SoftWindowRecovery for TempFileRecovery {
    fn recover(&self, position: u64, length: usize) -> Result<Arc<[u8]>> {
        if !self.path.exists() {
            return Err(Error::Cache(CacheError::TempFileMissing(self.path.clone())));
        }
        let mut file = File::open(&self.path)?;
        let offset = position - self.start_offset;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; length];
        file.read_exact(&mut buf)?;
        Ok(Arc::from(buf.into_boxed_slice()))
    }
}

/// A sequential, write-once spill file keyed by absolute window position.
pub struct TempFileStreamCache {
    window_size: usize,
    dir: Option<PathBuf>,
    named: Option<tempfile::NamedTempFile>,
    start_offset: Option<u64>,
    /// Total bytes appended so far; `start_offset + written` is the
    /// position the next added window must match.
    written: u64,
    observers: ObserverList,
}

impl TempFileStreamCache {
    pub fn new(window_size: usize) -> Self {
        TempFileStreamCache {
            window_size,
            dir: None,
            named: None,
            start_offset: None,
            written: 0,
            observers: ObserverList::default(),
        }
    }

    pub fn in_dir(window_size: usize, dir: impl Into<PathBuf>) -> Self {
        TempFileStreamCache {
            window_size,
            dir: Some(dir.into()),
            named: None,
            start_offset: None,
            written: 0,
            observers: ObserverList::default(),
        }
    }

    fn path(&self) -> Option<&Path> {
        self.named.as_ref().map(|f| f.path())
    }

    fn ensure_file(&mut self) -> Result<()> {
        if self.named.is_none() {
            let named = match &self.dir {
                Some(dir) => tempfile::Builder::new().prefix("byteseek-").tempfile_in(dir)?,
                None => tempfile::NamedTempFile::new()?,
            };
            log::debug!("temp-file stream cache created spill file at {:?}", named.path());
            self.named = Some(named);
        }
        Ok(())
    }

    fn recovery(&self) -> Rc<dyn SoftWindowRecovery> {
        Rc::new(TempFileRecovery {
            path: self.path().expect("file exists by construction").to_path_buf(),
            start_offset: self.start_offset.expect("start offset set by construction"),
        })
    }
}

impl WindowCache for TempFileStreamCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        let start = self.start_offset?;
        if pos < start || pos >= start + self.written {
            return None;
        }
        let offset = pos - start;
        let remaining = self.written - offset;
        let length = (remaining.min(self.window_size as u64)) as usize;
        let recovery = self.recovery();
        let array = recovery.recover(pos, length).ok()?;
        Some(Window::soft(pos, length, array, recovery))
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        let pos = window.position();
        match self.start_offset {
            None => {
                self.ensure_file()?;
                self.start_offset = Some(pos);
            }
            Some(start) => {
                let expected = start + self.written;
                if pos != expected {
                    return Err(Error::Cache(CacheError::NonSequentialWindow {
                        expected,
                        offered: pos,
                    }));
                }
            }
        }
        let array = window.array()?;
        let bytes = &array[..window.length()];
        self.named
            .as_mut()
            .expect("file created above")
            .write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if let Some(named) = self.named.take() {
            let path = named.path().to_path_buf();
            if let Err(persist_err) = named.close() {
                let source = persist_err.error;
                return Err(Error::State(StateError::TempFileNotDeleted { path, source }));
            }
            log::debug!("temp-file stream cache deleted spill file at {:?}", path);
        }
        self.start_offset = None;
        self.written = 0;
        Ok(())
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.unsubscribe(observer);
    }
}
