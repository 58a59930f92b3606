//! A write-around cache: new windows are written straight to the
//! persistent tier, bypassing memory; reads pull back into memory only on
//! a persistent hit.

use std::rc::Rc;

use super::{CacheObserver, ObserverList, WindowCache};
use crate::error::Result;
use crate::window::Window;

pub struct WriteAroundCache {
    memory: Box<dyn WindowCache>,
    persistent: Box<dyn WindowCache>,
    observers: ObserverList,
}

impl WriteAroundCache {
    pub fn new(memory: Box<dyn WindowCache>, persistent: Box<dyn WindowCache>) -> Self {
        WriteAroundCache { memory, persistent, observers: ObserverList::default() }
    }
}

impl WindowCache for WriteAroundCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        if let Some(window) = self.memory.get_window(pos) {
            return Some(window);
        }
        let window = self.persistent.get_window(pos)?;
        if let Err(err) = self.memory.add_window(window.clone()) {
            log::warn!("write-around cache failed to pull window into memory: {err}");
        }
        Some(window)
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        // Deliberately bypasses memory: a freshly written window is not
        // assumed to be about to be re-read.
        self.persistent.add_window(window)
    }

    fn clear(&mut self) -> Result<()> {
        let memory_result = self.memory.clear();
        let persistent_result = self.persistent.clear();
        // Attempt both regardless of order of failure, but surface the
        // first error observed (memory is cleared first above).
        memory_result.and(persistent_result)
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.unsubscribe(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AllCache;
    use std::sync::Arc;

    fn w(pos: u64) -> Window {
        Window::hard(pos, 4, Arc::from(vec![pos as u8; 4].into_boxed_slice()))
    }

    #[test]
    fn add_window_skips_memory() {
        let mut cache =
            WriteAroundCache::new(Box::new(AllCache::new()), Box::new(AllCache::new()));
        cache.add_window(w(0)).unwrap();
        assert!(cache.memory.get_window(0).is_none());
        assert!(cache.persistent.get_window(0).is_some());
    }

    #[test]
    fn read_miss_in_memory_pulls_from_persistent() {
        let mut cache =
            WriteAroundCache::new(Box::new(AllCache::new()), Box::new(AllCache::new()));
        cache.add_window(w(0)).unwrap();
        assert!(cache.get_window(0).is_some());
        assert!(cache.memory.get_window(0).is_some(), "promoted into memory on hit");
    }

    #[test]
    fn clear_attempts_both_tiers() {
        let mut cache =
            WriteAroundCache::new(Box::new(AllCache::new()), Box::new(AllCache::new()));
        cache.add_window(w(0)).unwrap();
        cache.get_window(0);
        assert!(cache.clear().is_ok());
        assert!(cache.memory.get_window(0).is_none());
        assert!(cache.persistent.get_window(0).is_none());
    }
}
