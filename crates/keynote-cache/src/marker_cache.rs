use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use keynote_host::DocumentKey;
use keynote_scan::Marker;

use crate::entry::{CacheEntry, CacheStats, InvalidationReason, StatsCounters};
use crate::Fingerprint;

type Slot = Arc<Mutex<Option<CacheEntry<Arc<Vec<Marker>>>>>>;

/// Memoizes the full-document marker scan per source document.
///
/// Locking is two-level: the registry mutex only hands out per-document
/// slots, and a slot's own mutex is held across a scan. Concurrent
/// requesters for the same document therefore block on (and then share) the
/// in-flight computation, so at most one scan runs per document at any time,
/// while requests for different documents never contend with each other.
///
/// Entries have no size bound beyond one per distinct document; eviction is
/// staleness-driven only.
#[derive(Debug, Default)]
pub struct MarkerCache {
    slots: Mutex<HashMap<DocumentKey, Slot>>,
    stats: StatsCounters,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &DocumentKey) -> Slot {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Returns the cached marker list for `key` when its fingerprint still
    /// matches, otherwise runs `scan` exactly once and stores the result
    /// before returning it. Errors from `scan` are propagated and nothing
    /// is cached for them.
    pub fn get_or_scan<E>(
        &self,
        key: &DocumentKey,
        fingerprint: &Fingerprint,
        scan: impl FnOnce() -> Result<Vec<Marker>, E>,
    ) -> Result<Arc<Vec<Marker>>, E> {
        let slot = self.slot(key);
        let mut entry = slot.lock();

        if let Some(existing) = entry.as_ref() {
            if existing.is_valid(fingerprint) {
                self.stats.hit();
                return Ok(Arc::clone(existing.value()));
            }
            tracing::debug!(
                target = "keynote.cache",
                path = %key.path().display(),
                "marker cache entry stale; rescanning"
            );
            self.stats.invalidated(InvalidationReason::Stale);
            *entry = None;
        }

        self.stats.miss();
        let markers = Arc::new(scan()?);
        *entry = Some(CacheEntry::new(Arc::clone(&markers), fingerprint.clone()));
        Ok(markers)
    }

    /// Force-drops one document's entry (e.g. after a known edit).
    pub fn invalidate(&self, key: &DocumentKey) {
        let slot = { self.slots.lock().get(key).cloned() };
        let Some(slot) = slot else { return };
        if slot.lock().take().is_some() {
            self.stats.invalidated(InvalidationReason::Explicit);
            tracing::debug!(
                target = "keynote.cache",
                path = %key.path().display(),
                "marker cache entry explicitly invalidated"
            );
        }
    }

    /// Force-drops every entry.
    pub fn clear(&self) {
        let slots: Vec<Slot> = { self.slots.lock().values().cloned().collect() };
        let mut dropped = 0_usize;
        for slot in slots {
            if slot.lock().take().is_some() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            self.stats.invalidated(InvalidationReason::Explicit);
        }
        tracing::debug!(target = "keynote.cache", dropped, "marker cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = {
            let slots = self.slots.lock();
            slots
                .values()
                .filter(|slot| slot.lock().is_some())
                .count()
        };
        self.stats.snapshot(entries)
    }
}
