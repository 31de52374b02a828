use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::Fingerprint;

/// A memoized value plus the fingerprint of the inputs that produced it.
///
/// An entry is valid if and only if its stored fingerprint equals the
/// fingerprint recomputed from the live source; invalid entries are evicted
/// lazily on the next access and never served.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    fingerprint: Fingerprint,
    created: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, fingerprint: Fingerprint) -> Self {
        Self {
            value,
            fingerprint,
            created: Instant::now(),
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn created(&self) -> Instant {
        self.created
    }

    pub fn is_valid(&self, current: &Fingerprint) -> bool {
        self.fingerprint == *current
    }
}

/// Why a cache entry was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The source fingerprint no longer matched the stored one.
    Stale,
    /// A caller force-cleared the entry (e.g. after a known document edit).
    Explicit,
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationReason::Stale => f.write_str("stale"),
            InvalidationReason::Explicit => f.write_str("explicit"),
        }
    }
}

/// Point-in-time cache statistics for operator tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub last_invalidation: Option<InvalidationReason>,
}

/// Shared counter block used by both caches.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    last_invalidation: Mutex<Option<InvalidationReason>>,
}

impl StatsCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn invalidated(&self, reason: InvalidationReason) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        *self.last_invalidation.lock() = Some(reason);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            last_invalidation: *self.last_invalidation.lock(),
        }
    }
}
