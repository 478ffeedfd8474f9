//! Time-to-live cache for network snapshots
//!
//! The cache is a plain value owned by whoever fetches network data. Time is
//! read through an injected [`Clock`] so expiry can be tested without
//! sleeping.

use crate::NetworkSnapshot;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock();
        *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: NetworkSnapshot,
    stored_at: DateTime<Utc>,
}

/// Single-slot snapshot cache with a fixed time-to-live
pub struct SnapshotCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: Option<CacheEntry>,
}

impl SnapshotCache {
    /// Create an empty cache
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: None,
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh snapshot, if one is cached and not expired
    pub fn get(&self) -> Option<&NetworkSnapshot> {
        if self.is_expired() {
            None
        } else {
            self.entry.as_ref().map(|entry| &entry.snapshot)
        }
    }

    /// Last stored snapshot regardless of age
    pub fn get_stale(&self) -> Option<&NetworkSnapshot> {
        self.entry.as_ref().map(|entry| &entry.snapshot)
    }

    /// Store a snapshot, stamping it with the clock's current time
    pub fn set(&mut self, snapshot: NetworkSnapshot) {
        self.entry = Some(CacheEntry {
            snapshot,
            stored_at: self.clock.now(),
        });
    }

    /// True when empty or when the entry is at least `ttl` old
    pub fn is_expired(&self) -> bool {
        match self.age() {
            Some(age) => age >= self.ttl,
            None => true,
        }
    }

    /// Age of the stored entry
    pub fn age(&self) -> Option<Duration> {
        self.entry.as_ref().map(|entry| {
            (self.clock.now() - entry.stored_at)
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }
}
