//! A two-level cache: a primary tier that is tried first, backed by a
//! secondary tier that receives whatever the primary evicts.

use std::cell::RefCell;
use std::rc::Rc;

use super::{CacheObserver, ObserverList, WindowCache};
use crate::error::Result;
use crate::window::Window;

/// Forwards everything evicted from the primary into the secondary. This
/// is how `TwoLevelCache` "subscribes itself" to its primary — wired once,
/// in [`TwoLevelCache::new`], rather than through a two-phase
/// construct-then-attach dance.
struct PromoteToSecondary {
    secondary: Rc<RefCell<Box<dyn WindowCache>>>,
}

impl CacheObserver for PromoteToSecondary {
    fn window_free(&self, window: &Window, _from_cache: bool) {
        // Errors here (e.g. a write-through failure) are not fatal to the
        // primary's own eviction; the window is simply lost from both
        // tiers, matching §7's "swallow only in the release path of
        // eviction" policy.
        if let Err(err) = self.secondary.borrow_mut().add_window(window.clone()) {
            log::warn!("two-level cache failed to promote evicted window into secondary: {err}");
        }
    }
}

/// Forwards the secondary's evictions out to `TwoLevelCache`'s own
/// subscribers — the point at which a window has genuinely left every
/// tier.
struct ExitNotifier {
    observers: Rc<RefCell<ObserverList>>,
}

impl CacheObserver for ExitNotifier {
    fn window_free(&self, window: &Window, _from_cache: bool) {
        self.observers.borrow().notify(window, true);
    }
}

pub struct TwoLevelCache {
    primary: Rc<RefCell<Box<dyn WindowCache>>>,
    secondary: Rc<RefCell<Box<dyn WindowCache>>>,
    observers: Rc<RefCell<ObserverList>>,
}

impl TwoLevelCache {
    pub fn new(primary: Box<dyn WindowCache>, secondary: Box<dyn WindowCache>) -> Self {
        let primary = Rc::new(RefCell::new(primary));
        let secondary = Rc::new(RefCell::new(secondary));
        let observers = Rc::new(RefCell::new(ObserverList::default()));

        primary
            .borrow_mut()
            .subscribe(Rc::new(PromoteToSecondary { secondary: secondary.clone() }));
        secondary
            .borrow_mut()
            .subscribe(Rc::new(ExitNotifier { observers: observers.clone() }));

        TwoLevelCache { primary, secondary, observers }
    }
}

impl WindowCache for TwoLevelCache {
    fn get_window(&mut self, pos: u64) -> Option<Window> {
        if let Some(window) = self.primary.borrow_mut().get_window(pos) {
            return Some(window);
        }
        let from_secondary = self.secondary.borrow_mut().get_window(pos)?;
        // Promote back into the primary so the next lookup is a primary hit.
        if let Err(err) = self.primary.borrow_mut().add_window(from_secondary.clone()) {
            log::warn!("two-level cache failed to promote window into primary: {err}");
        }
        Some(from_secondary)
    }

    fn add_window(&mut self, window: Window) -> Result<()> {
        self.primary.borrow_mut().add_window(window)
    }

    fn clear(&mut self) -> Result<()> {
        let primary_result = self.primary.borrow_mut().clear();
        let secondary_result = self.secondary.borrow_mut().clear();
        primary_result.and(secondary_result)
    }

    fn subscribe(&mut self, observer: Rc<dyn CacheObserver>) {
        self.observers.borrow_mut().subscribe(observer);
    }

    fn unsubscribe(&mut self, observer: &Rc<dyn CacheObserver>) {
        self.observers.borrow_mut().unsubscribe(observer);
    }
}
