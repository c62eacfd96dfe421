//! Wall-clock source for cursor defaults and advancement.

use chrono::Utc;
use devsync_types::EpochMillis;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> EpochMillis;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        EpochMillis::new(Utc::now().timestamp_millis())
    }
}

/// A clock that only moves when told to. Hosts use it to replay a pass at
/// a fixed instant.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(now: EpochMillis) -> Self {
        Self {
            millis: AtomicI64::new(now.as_millis()),
        }
    }

    pub fn set(&self, now: EpochMillis) {
        self.millis.store(now.as_millis(), Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMillis {
        EpochMillis::new(self.millis.load(Ordering::SeqCst))
    }
}
