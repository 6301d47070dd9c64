//! Buffer pool statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the buffer pool.
///
/// Updated with `Ordering::Relaxed`: each counter only needs atomicity,
/// and a snapshot is allowed to be slightly inconsistent across fields.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// `pin_page` found the page resident.
    pub cache_hits: AtomicU64,
    /// `pin_page` had to load the page.
    pub cache_misses: AtomicU64,
    /// Resident pages displaced to make room.
    pub evictions: AtomicU64,
    pub pages_read: AtomicU64,
    pub pages_written: AtomicU64,
    /// Pages created through `new_page`.
    pub pages_allocated: AtomicU64,
    /// Pages released through `free_page`.
    pub pages_freed: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy every counter into a plain value for display or comparison.
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            cache_hits: load(&self.cache_hits),
            cache_misses: load(&self.cache_misses),
            evictions: load(&self.evictions),
            pages_read: load(&self.pages_read),
            pages_written: load(&self.pages_written),
            pages_allocated: load(&self.pages_allocated),
            pages_freed: load(&self.pages_freed),
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
    pub pages_freed: u64,
}

impl StatsSnapshot {
    /// Fraction of pins served without I/O (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit_rate: {:.2}%",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}
