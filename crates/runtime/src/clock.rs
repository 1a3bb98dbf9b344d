use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use sohl_core::{WorldClock, WorldTime};

/// World clock shared between a session and the host that pushes time.
///
/// Clones observe the same time.
#[derive(Clone, Debug, Default)]
pub struct SharedWorldClock {
    now: Arc<AtomicI64>,
}

impl SharedWorldClock {
    pub fn new(now: WorldTime) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    /// Called by the host when its world time changes.
    pub fn set(&self, now: WorldTime) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: WorldTime) -> WorldTime {
        self.now.fetch_add(seconds, Ordering::SeqCst) + seconds
    }
}

impl WorldClock for SharedWorldClock {
    fn world_time(&self) -> WorldTime {
        self.now.load(Ordering::SeqCst)
    }
}
