//! A `Window` is a fixed-size chunk of bytes tagged with its absolute
//! position in some byte source. Readers hand them out; caches store them
//! keyed by position; matchers and searchers read through them.
//!
//! There are two variants. A [`HardWindow`] owns its backing array for its
//! whole lifetime in a cache. A [`SoftWindow`] owns its array weakly: the
//! bytes may be reclaimed under memory pressure, and the next read
//! re-materializes them through a [`SoftWindowRecovery`] callback. Both are
//! wrapped by the [`Window`] enum so callers never need to know which one
//! they hold.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::cell::RefCell;

use crate::error::{CompositionError, Error, Result};

/// Supplies the original bytes of a soft window again, after they have been
/// reclaimed. The recovered bytes must be identical to what was originally
/// in the window — the window's position and intended length are content
/// addressed by the origin that produced it (a file offset, a cached
/// upstream window, and so on), not by anything this trait can verify on
/// its own.
pub trait SoftWindowRecovery: fmt::Debug {
    /// Re-read (or recompute) the window's bytes. Must return exactly
    /// `length` bytes.
    fn recover(&self, position: u64, length: usize) -> Result<Arc<[u8]>>;
}

/// A window whose array is owned for the whole time it is reachable.
#[derive(Clone, Debug)]
pub struct HardWindow {
    position: u64,
    length: usize,
    array: Arc<[u8]>,
}

impl HardWindow {
    /// `array.len()` is the reader's window size; `length` may be smaller
    /// only for the final, short window at end-of-source.
    pub fn new(position: u64, length: usize, array: Arc<[u8]>) -> Self {
        assert!(length > 0, "window length must be positive");
        assert!(length <= array.len(), "length exceeds backing array size");
        HardWindow { position, length, array }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn array(&self) -> &Arc<[u8]> {
        &self.array
    }

    pub fn get_byte(&self, offset: usize) -> Option<u8> {
        if offset < self.length {
            Some(self.array[offset])
        } else {
            None
        }
    }
}

/// A window whose array may be reclaimed under memory pressure and is
/// restored on demand.
#[derive(Clone)]
pub struct SoftWindow {
    position: u64,
    length: usize,
    array: Rc<RefCell<Option<Arc<[u8]>>>>,
    recovery: Rc<dyn SoftWindowRecovery>,
}

impl fmt::Debug for SoftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftWindow")
            .field("position", &self.position)
            .field("length", &self.length)
            .field("reclaimed", &self.array.borrow().is_none())
            .finish()
    }
}

impl SoftWindow {
    pub fn new(
        position: u64,
        length: usize,
        array: Arc<[u8]>,
        recovery: Rc<dyn SoftWindowRecovery>,
    ) -> Self {
        assert!(length > 0, "window length must be positive");
        SoftWindow {
            position,
            length,
            array: Rc::new(RefCell::new(Some(array))),
            recovery,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Release the backing array, simulating reclamation under memory
    /// pressure. The next access triggers recovery.
    pub fn reclaim(&self) {
        log::trace!("reclaiming soft window at position {}", self.position);
        *self.array.borrow_mut() = None;
    }

    pub fn array(&self) -> Result<Arc<[u8]>> {
        if let Some(array) = self.array.borrow().as_ref() {
            return Ok(Arc::clone(array));
        }
        log::debug!(
            "recovering soft window at position {} (length {})",
            self.position, self.length
        );
        let recovered = self.recovery.recover(self.position, self.length)?;
        if recovered.len() != self.length {
            return Err(Error::Composition(CompositionError::RecoveryLengthMismatch {
                expected: self.length,
                got: recovered.len(),
            }));
        }
        *self.array.borrow_mut() = Some(Arc::clone(&recovered));
        Ok(recovered)
    }

    pub fn get_byte(&self, offset: usize) -> Result<Option<u8>> {
        if offset >= self.length {
            return Ok(None);
        }
        Ok(Some(self.array()?[offset]))
    }
}

/// A fixed-size chunk of bytes drawn from an absolute source position. See
/// the module documentation for the hard/soft distinction.
#[derive(Clone, Debug)]
pub enum Window {
    Hard(HardWindow),
    Soft(SoftWindow),
}

impl Window {
    pub fn hard(position: u64, length: usize, array: Arc<[u8]>) -> Self {
        Window::Hard(HardWindow::new(position, length, array))
    }

    pub fn soft(
        position: u64,
        length: usize,
        array: Arc<[u8]>,
        recovery: Rc<dyn SoftWindowRecovery>,
    ) -> Self {
        Window::Soft(SoftWindow::new(position, length, array, recovery))
    }

    pub fn position(&self) -> u64 {
        match self {
            Window::Hard(w) => w.position(),
            Window::Soft(w) => w.position(),
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Window::Hard(w) => w.length(),
            Window::Soft(w) => w.length(),
        }
    }

    /// The window's bytes, recovering them first if this is a reclaimed
    /// soft window.
    pub fn array(&self) -> Result<Arc<[u8]>> {
        match self {
            Window::Hard(w) => Ok(Arc::clone(w.array())),
            Window::Soft(w) => w.array(),
        }
    }

    /// The byte at `offset` within the window, where
    /// `0 <= offset < length()`.
    pub fn get_byte(&self, offset: usize) -> Result<Option<u8>> {
        match self {
            Window::Hard(w) => Ok(w.get_byte(offset)),
            Window::Soft(w) => w.get_byte(offset),
        }
    }

    /// Absolute position one past the last byte in this window.
    pub fn end_position(&self) -> u64 {
        self.position() + self.length() as u64
    }

    pub fn contains(&self, absolute_pos: u64) -> bool {
        absolute_pos >= self.position() && absolute_pos < self.end_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct FixedRecovery {
        bytes: Arc<[u8]>,
        calls: Cell<usize>,
    }

    impl SoftWindowRecovery for FixedRecovery {
        fn recover(&self, _position: u64, _length: usize) -> Result<Arc<[u8]>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Arc::clone(&self.bytes))
        }
    }

    #[test]
    fn hard_window_reads_bytes_in_range() {
        let array: Arc<[u8]> = Arc::from(&b"abcdef"[..]);
        let w = Window::hard(0, 4, array);
        assert_eq!(w.get_byte(0).unwrap(), Some(b'a'));
        assert_eq!(w.get_byte(3).unwrap(), Some(b'd'));
        assert_eq!(w.get_byte(4).unwrap(), None);
        assert_eq!(w.length(), 4);
        assert_eq!(w.end_position(), 4);
    }

    #[test]
    fn soft_window_recovers_after_reclaim() {
        let bytes: Arc<[u8]> = Arc::from(&b"xyz"[..]);
        let recovery = Rc::new(FixedRecovery { bytes: Arc::clone(&bytes), calls: Cell::new(0) });
        let w = match Window::soft(10, 3, Arc::clone(&bytes), recovery.clone()) {
            Window::Soft(sw) => sw,
            _ => unreachable!(),
        };
        assert_eq!(recovery.calls.get(), 0);
        assert_eq!(w.get_byte(1).unwrap(), Some(b'y'));
        assert_eq!(recovery.calls.get(), 0, "array still present, no recovery needed");

        w.reclaim();
        assert_eq!(w.get_byte(0).unwrap(), Some(b'x'));
        assert_eq!(recovery.calls.get(), 1, "recovery invoked once after reclaim");
    }

    #[test]
    fn soft_window_recovery_length_mismatch_is_an_error() {
        #[derive(Debug)]
        struct BadRecovery;
        impl SoftWindowRecovery for BadRecovery {
            fn recover(&self, _position: u64, _length: usize) -> Result<Arc<[u8]>> {
                Ok(Arc::from(&b"short"[..]))
            }
        }
        let bytes: Arc<[u8]> = Arc::from(&b"0123456789"[..]);
        let w = match Window::soft(0, 10, bytes, Rc::new(BadRecovery)) {
            Window::Soft(sw) => sw,
            _ => unreachable!(),
        };
        w.reclaim();
        assert!(w.array().is_err());
    }

    #[test]
    fn contains_respects_half_open_range() {
        let array: Arc<[u8]> = Arc::from(vec![0u8; 16].into_boxed_slice());
        let w = Window::hard(32, 16, array);
        assert!(!w.contains(31));
        assert!(w.contains(32));
        assert!(w.contains(47));
        assert!(!w.contains(48));
    }
}
