//! The simple bounded-mapping cache strategies: `None`, `All`,
//! most-recently-used, least-recently-used, and least-frequently-used.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::rc::Rc;

use super::{CacheObserver, ObserverList, WindowCache};
use crate::error::Result;
use crate::window::Window;

/// Caches nothing; every lookup misses and every window offered is
/// discarded immediately (fired as a free-notification with
/// `from_cache = true`, since it never actually enters storage).
#[derive(Default)]
pub struct NoCache {
    observers: ObserverList,
}

impl NoCache {
    pub fn new() -> Self {
        NoCache::default()
    }
}

impl WindowCache for NoCache {
    fn get_window(&mut self, _pos: u64) -> Option<Window> {
        None
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        self.observers.notify(&window, true);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.unsubscribe(observer);
    }
}

/// Caches every window offered, with no eviction and no bound.
#[derive(Default)]
pub struct AllCache {
    windows: HashMap<u64, Window>,
    observers: ObserverList,
}

impl AllCache {
    pub fn new() -> Self {
        AllCache::default()
    }
}

impl WindowCache for AllCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        self.windows.get(&pos).cloned()
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        self.windows.insert(window.position(), window);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        for (_, window) in self.windows.drain() {
            self.observers.notify(&window, true);
        }
        Ok(())
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.unsubscribe(observer);
    }
}

/// Bounded cache that evicts the *most* recently touched window when full.
/// Unusual, but a legitimate strategy when recently-read windows are
/// unlikely to be re-read soon (e.g. a single forward scan that
/// occasionally backtracks a little).
#[derive(Default)]
pub struct MostRecentlyUsedCache {
    capacity: usize,
    windows: HashMap<u64, Window>,
    // Back = most recently touched.
    order: VecDeque<u64>,
    observers: ObserverList,
}

impl MostRecentlyUsedCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        MostRecentlyUsedCache {
            capacity: capacity.get(),
            windows: HashMap::new(),
            order: VecDeque::new(),
            observers: ObserverList::default(),
        }
    }

    fn touch(&mut self, pos: u64) {
        if let Some(idx) = self.order.iter().position(|&p| p == pos) {
            self.order.remove(idx);
        }
        self.order.push_back(pos);
    }

    fn evict_most_recent(&mut self) {
        if let Some(pos) = self.order.pop_back() {
            if let Some(window) = self.windows.get(&pos).cloned() {
                log::trace!("MRU cache evicting window at {pos}");
                self.observers.notify(&window, true);
                self.windows.remove(&pos);
            }
        }
    }
}

impl WindowCache for MostRecentlyUsedCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        let hit = self.windows.get(&pos).cloned();
        if hit.is_some() {
            self.touch(pos);
        }
        hit
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        let pos = window.position();
        if !self.windows.contains_key(&pos) && self.windows.len() >= self.capacity {
            self.evict_most_recent();
        }
        self.windows.insert(pos, window);
        self.touch(pos);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.order.clear();
        for (_, window) in self.windows.drain() {
            self.observers.notify(&window, true);
        }
        Ok(())
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.unsubscribe(observer);
    }
}

/// Bounded cache that evicts the least-recently touched window when full,
/// backed directly by [`lru::LruCache`].
pub struct LeastRecentlyUsedCache {
    inner: lru::LruCache<u64, Window>,
    observers: ObserverList,
}

impl LeastRecentlyUsedCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        LeastRecentlyUsedCache {
            inner: lru::LruCache::new(capacity),
            observers: ObserverList::default(),
        }
    }
}

impl WindowCache for LeastRecentlyUsedCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        self.inner.get(&pos).cloned()
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        let pos = window.position();
        // `push` reports both a capacity eviction and a same-key value
        // replacement identically, so the eviction case is detected here,
        // before the window leaves storage, instead of after the fact.
        if !self.inner.contains(&pos) && self.inner.len() >= self.inner.cap().get() {
            if let Some((evicted_pos, evicted_window)) = self.inner.peek_lru() {
                log::trace!("LRU cache evicting window at {evicted_pos}");
                self.observers.notify(evicted_window, true);
            }
        }
        self.inner.push(pos, window);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        while let Some((_, window)) = self.inner.pop_lru() {
            self.observers.notify(&window, true);
        }
        Ok(())
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.unsubscribe(observer);
    }
}

/// Bounded cache that evicts the window with the lowest access count when
/// full, breaking ties by lowest position. `lru` has no least-frequently-used
/// variant, so this is hand-rolled the way `campross` hand-rolls every
/// compression algorithm it needs rather than reaching for a crate.
#[derive(Default)]
pub struct LeastFrequentlyUsedCache {
    capacity: usize,
    entries: HashMap<u64, (Window, u64)>,
    observers: ObserverList,
}

impl LeastFrequentlyUsedCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        LeastFrequentlyUsedCache {
            capacity: capacity.get(),
            entries: HashMap::new(),
            observers: ObserverList::default(),
        }
    }

    fn evict_least_frequent(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(&pos, &(_, count))| (count, pos))
            .map(|(&pos, _)| pos);
        if let Some(pos) = victim {
            if let Some((window, _)) = self.entries.get(&pos).cloned() {
                log::trace!("LFU cache evicting window at {pos}");
                self.observers.notify(&window, true);
                self.entries.remove(&pos);
            }
        }
    }
}

impl WindowCache for LeastFrequentlyUsedCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        match self.entries.get_mut(&pos) {
            Some((window, count)) => {
                *count += 1;
                Some(window.clone())
            }
            None => None,
        }
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        let pos = window.position();
        if !self.entries.contains_key(&pos) && self.entries.len() >= self.capacity {
            self.evict_least_frequent();
        }
        self.entries.insert(pos, (window, 0));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        for (_, (window, _)) in self.entries.drain() {
            self.observers.notify(&window, true);
        }
        Ok(())
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
    use std::sync::Arc;

    fn w(pos: u64) -> Window {
        Window::hard(pos, 4, Arc::from(vec![pos as u8; 4].into_boxed_slice()))
    }

    struct Collector(std::cell::RefCell<Vec<u64>>);
    impl CacheObserver for Collector {
        fn window_free(&self, window: &Window, _from_cache: bool) {
            self.0.borrow_mut().push(window.position());
        }
    }

    #[test]
    fn no_cache_always_misses_and_notifies_immediately() {
        let mut cache = NoCache::new();
        let collector = Rc::new(Collector(Default::default()));
        cache.subscribe(collector.clone());
        cache.add_window(w(0)).unwrap();
        assert!(cache.get_window(0).is_none());
        assert_eq!(*collector.0.borrow(), vec![0]);
    }

    #[test]
    fn all_cache_never_evicts() {
        let mut cache = AllCache::new();
        for i in 0..100 {
            cache.add_window(w(i)).unwrap();
        }
        assert!(cache.get_window(0).is_some());
        assert!(cache.get_window(99).is_some());
    }

    #[test]
    fn mru_cache_evicts_the_most_recently_touched_window() {
        let mut cache = MostRecentlyUsedCache::new(NonZeroUsize::new(2).unwrap());
        cache.add_window(w(0)).unwrap();
        cache.add_window(w(1)).unwrap();
        // Touch 0, making it most recent.
        assert!(cache.get_window(0).is_some());
        // Adding a third window evicts 0 (the most recently touched).
        cache.add_window(w(2)).unwrap();
        assert!(cache.get_window(0).is_none());
        assert!(cache.get_window(1).is_some());
        assert!(cache.get_window(2).is_some());
    }

    #[test]
    fn lru_cache_evicts_the_least_recently_touched_window() {
        let mut cache = LeastRecentlyUsedCache::new(NonZeroUsize::new(2).unwrap());
        cache.add_window(w(0)).unwrap();
        cache.add_window(w(1)).unwrap();
        assert!(cache.get_window(0).is_some());
        cache.add_window(w(2)).unwrap();
        assert!(cache.get_window(1).is_none());
        assert!(cache.get_window(0).is_some());
        assert!(cache.get_window(2).is_some());
    }

    #[test]
    fn lfu_cache_evicts_the_least_frequently_touched_window() {
        let mut cache = LeastFrequentlyUsedCache::new(NonZeroUsize::new(2).unwrap());
        cache.add_window(w(0)).unwrap();
        cache.add_window(w(1)).unwrap();
        cache.get_window(0);
        cache.get_window(0);
        cache.get_window(1);
        cache.add_window(w(2)).unwrap();
        assert!(cache.get_window(1).is_none());
        assert!(cache.get_window(0).is_some());
        assert!(cache.get_window(2).is_some());
    }

    #[test]
    fn clear_notifies_observers_for_every_remaining_window() {
        let mut cache = AllCache::new();
        let collector = Rc::new(Collector(Default::default()));
        cache.subscribe(collector.clone());
        cache.add_window(w(0)).unwrap();
        cache.add_window(w(1)).unwrap();
        cache.clear().unwrap();
        let mut seen = collector.0.borrow().clone();
        seen.sort();
        assert_eq!(seen, vec![0, 1]);
    }
}
