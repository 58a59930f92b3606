//! Pluggable window caches.
//!
//! A [`WindowCache`] is a mapping from absolute window position to
//! [`Window`], with bounded strategies publishing a free-notification to
//! subscribed [`CacheObserver`]s before the window actually leaves internal
//! storage. That ordering is what lets [`two_level::TwoLevelCache`] copy an
//! evicted window into its secondary tier atomically with respect to any
//! external observer.
//!
//! Every cache here is single-writer (`&mut self` throughout); sharing one
//! across threads needs external synchronization, per the crate's
//! concurrency model.

mod bounded;
mod temp_file;
mod two_level;
mod write_around;

pub use bounded::{
    AllCache, LeastFrequentlyUsedCache, LeastRecentlyUsedCache, MostRecentlyUsedCache, NoCache,
};
pub use temp_file::TempFileStreamCache;
pub use two_level::TwoLevelCache;
pub use write_around::WriteAroundCache;

use std::rc::Rc;

use crate::error::Result;
use crate::window::Window;

/// Receives a notification when a window is about to leave a cache.
///
/// `from_cache` is `true` when this is the final hop before the window is
/// gone from every tier that wraps the cache issuing the notification —
/// e.g. [`two_level::TwoLevelCache`] suppresses its primary's raw eviction
/// notifications and only calls subscribers once the window has also left
/// the secondary. It is `false` for notifications that are purely
/// informational (the window is being copied onward, not discarded).
///
/// Implementations must not retain a reference to `window` past the call
/// unless they explicitly re-cache it (e.g. by inserting it into another
/// `WindowCache`).
pub trait CacheObserver {
    fn window_free(&self, window: &Window, from_cache: bool);
}

/// A keyed store of [`Window`]s, with a pluggable eviction/spill strategy.
pub trait WindowCache {
    /// Look up the window at `pos`, or `None` on a miss. The caller must
    /// then ask the originating [`crate::reader::WindowReader`].
    fn get_window(&mut self, pos: u64) -> Option<Window>;

    /// Offer a freshly created window to the cache. Strategies are free to
    /// ignore it (e.g. [`NoCache`]).
    fn add_window(&mut self, window: Window) -> Result<()>;

    /// Copy up to `dst.len()` bytes starting at `offset` within the window
    /// at `window_pos`, without necessarily materializing a full `Window`
    /// object (a temp-file-backed cache can read directly from its file).
    /// Returns the number of bytes copied; `0` means the cache cannot
    /// satisfy the read and the caller must fall back to the reader.
    fn read(&mut self, window_pos: u64, offset: usize, dst: &mut [u8]) -> usize {
        match self.get_window(window_pos) {
            Some(window) => {
                let Ok(array) = window.array() else { return 0 };
                let len = window.length();
                if offset >= len {
                    return 0;
                }
                let n = dst.len().min(len - offset);
                dst[..n].copy_from_slice(&array[offset..offset + n]);
                n
            }
            None => 0,
        }
    }

    /// Drop all cached windows. Implementations that compose multiple
    /// tiers attempt to clear every tier even if an earlier one fails, and
    /// surface the first error encountered.
    fn clear(&mut self) -> Result<()>;

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>);

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>);
}

/// Shared bookkeeping for the set of subscribers on a single cache tier.
#[derive(Default)]
pub(crate) struct ObserverList(Vec<Rc<dyn CacheObserver>>);

impl ObserverList {
    pub(crate) fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.0.push(observer);
    }

    pub(crate) fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.0.retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// Publish a free-notification to every subscriber. Must be called
    /// before the window is actually removed from internal storage.
    pub(crate) fn notify(&self, window: &Window, from_cache: bool) {
        for observer in &self.0 {
            observer.window_free(window, from_cache);
        }
    }
}
