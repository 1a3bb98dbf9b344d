use std::sync::atomic::{AtomicI64, Ordering};

/// World time in seconds, as pushed by the host.
pub type WorldTime = i64;

/// Source of the current world time.
///
/// The core never samples a wall clock; every time-dependent call reads the
/// world time through this trait.
pub trait WorldClock: Send + Sync {
    fn world_time(&self) -> WorldTime;
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: WorldTime) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: WorldTime) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: WorldTime) -> WorldTime {
        self.now.fetch_add(seconds, Ordering::SeqCst) + seconds
    }
}

impl WorldClock for FixedClock {
    fn world_time(&self) -> WorldTime {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_moves_on_request() {
        let clock = FixedClock::new(100);
        assert_eq!(clock.world_time(), 100);
        assert_eq!(clock.advance(20), 120);
        clock.set(5);
        assert_eq!(clock.world_time(), 5);
    }
}
