use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::types::navigation::NO_TAB;

/// Token identifying one tracking episode of a tab.
///
/// A clear that carries a generation only takes effect while the tab is
/// still tracked under that same generation, so a late timer from an
/// earlier redirect can never end a newer one.
///
/// Crosses the host bridge as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

/// Trait defining the redirect suppression interface.
///
/// Methods take `&self`: the guard is shared between the synchronous
/// navigation verdict and the asynchronous redirect continuation.
pub trait RedirectGuardTrait: Clone + Send + Sync + 'static {
    fn should_suppress(&self, tab_id: i64) -> bool;
    /// Starts tracking `tab_id` and arms the safety-net clear.
    /// Returns `None` for [`NO_TAB`], which is never tracked.
    fn mark_redirecting(&self, tab_id: i64) -> Option<Generation>;
    fn clear(&self, tab_id: i64);
    /// Clears `tab_id` only if it is still tracked under `generation`.
    fn clear_generation(&self, tab_id: i64, generation: Generation) -> bool;
    /// Replaces the pending timer of `tab_id` with one firing after `delay`.
    fn schedule_clear(&self, tab_id: i64, generation: Generation, delay: Duration);
    fn tracked_count(&self) -> usize;
}

struct TrackedTab {
    generation: Generation,
    timer: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct GuardState {
    tracked: HashMap<i64, TrackedTab>,
    next_generation: u64,
}

/// In-memory tracked-tab set with cancellable expiry timers.
#[derive(Clone)]
pub struct RedirectGuard {
    state: Arc<Mutex<GuardState>>,
    safety_net: Duration,
}

impl RedirectGuard {
    pub fn new(safety_net: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState::default())),
            safety_net,
        }
    }

    pub fn safety_net(&self) -> Duration {
        self.safety_net
    }

    /// Generation the tab is currently tracked under.
    pub fn generation_of(&self, tab_id: i64) -> Option<Generation> {
        self.state.lock().tracked.get(&tab_id).map(|t| t.generation)
    }

    /// Whether an expiry timer is pending for the tab.
    pub fn has_pending_timer(&self, tab_id: i64) -> bool {
        self.state
            .lock()
            .tracked
            .get(&tab_id)
            .and_then(|t| t.timer.as_ref())
            .is_some_and(|h| !h.is_finished())
    }

    /// Spawns the expiry task and attaches it to the tab's entry.
    /// Without a tokio runtime the entry simply waits for an explicit clear.
    fn arm_timer(&self, tab_id: i64, generation: Generation, delay: Duration) {
        let Ok(handle) = Handle::try_current() else {
            debug!(tab_id, "no runtime, redirect guard timer not armed");
            return;
        };
        let weak = Arc::downgrade(&self.state);
        let timer = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            expire(&weak, tab_id, generation);
        });

        let mut state = self.state.lock();
        match state.tracked.get_mut(&tab_id) {
            Some(entry) if entry.generation == generation => {
                if let Some(old) = entry.timer.replace(timer) {
                    old.abort();
                }
            }
            _ => timer.abort(),
        }
    }
}

impl Default for RedirectGuard {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

/// Timer callback. Drops the entry without aborting the (running) timer.
fn expire(state: &Weak<Mutex<GuardState>>, tab_id: i64, generation: Generation) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.lock();
    if state
        .tracked
        .get(&tab_id)
        .is_some_and(|t| t.generation == generation)
    {
        state.tracked.remove(&tab_id);
        trace!(tab_id, ?generation, "redirect guard expired");
    }
}

impl RedirectGuardTrait for RedirectGuard {
    fn should_suppress(&self, tab_id: i64) -> bool {
        if tab_id == NO_TAB {
            return false;
        }
        self.state.lock().tracked.contains_key(&tab_id)
    }

    fn mark_redirecting(&self, tab_id: i64) -> Option<Generation> {
        if tab_id == NO_TAB {
            return None;
        }
        let generation = {
            let mut state = self.state.lock();
            state.next_generation += 1;
            let generation = Generation(state.next_generation);
            let previous = state.tracked.insert(
                tab_id,
                TrackedTab {
                    generation,
                    timer: None,
                },
            );
            if let Some(old_timer) = previous.and_then(|p| p.timer) {
                old_timer.abort();
            }
            generation
        };
        self.arm_timer(tab_id, generation, self.safety_net);
        Some(generation)
    }

    fn clear(&self, tab_id: i64) {
        let removed = self.state.lock().tracked.remove(&tab_id);
        if let Some(timer) = removed.and_then(|t| t.timer) {
            timer.abort();
        }
    }

    fn clear_generation(&self, tab_id: i64, generation: Generation) -> bool {
        let removed = {
            let mut state = self.state.lock();
            match state.tracked.get(&tab_id) {
                Some(entry) if entry.generation == generation => state.tracked.remove(&tab_id),
                _ => None,
            }
        };
        match removed {
            Some(entry) => {
                if let Some(timer) = entry.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    fn schedule_clear(&self, tab_id: i64, generation: Generation, delay: Duration) {
        self.arm_timer(tab_id, generation, delay);
    }

    fn tracked_count(&self) -> usize {
        self.state.lock().tracked.len()
    }
}
