use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use keynote_core::{LayoutId, ViewportId};
use keynote_host::ViewportSpec;
use keynote_scan::{resolve_polygon, ViewportPolygon};

use crate::entry::{CacheEntry, CacheStats, InvalidationReason, StatsCounters};
use crate::Fingerprint;

type Key = (LayoutId, ViewportId);

/// Memoizes resolved viewport polygons per (layout, viewport).
///
/// Validity is a fingerprint over the viewport's center, scale, rotation and
/// clip boundary, so editing one viewport invalidates exactly that entry —
/// never the document's marker scan, never sibling viewports.
///
/// Resolution failures ("no derivable boundary") are cached as `None` under
/// the same fingerprint: an unresolvable viewport stays a cheap no-region
/// answer until its properties change.
#[derive(Debug, Default)]
pub struct ViewportCache {
    entries: Mutex<HashMap<Key, CacheEntry<Option<Arc<ViewportPolygon>>>>>,
    stats: StatsCounters,
}

impl ViewportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the polygon for `spec` within `layout`, resolving and caching
    /// it when missing or stale. `None` means the viewport contributes no
    /// containment region.
    pub fn get_or_resolve(
        &self,
        layout: &LayoutId,
        spec: &ViewportSpec,
    ) -> Option<Arc<ViewportPolygon>> {
        let key = (layout.clone(), spec.id);
        let fingerprint = Fingerprint::from_viewport(spec);

        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get(&key) {
                if entry.is_valid(&fingerprint) {
                    self.stats.hit();
                    return entry.value().clone();
                }
                tracing::debug!(
                    target = "keynote.cache",
                    layout = %key.0,
                    viewport = %key.1,
                    "viewport cache entry stale; re-resolving"
                );
                self.stats.invalidated(InvalidationReason::Stale);
                entries.remove(&key);
            }
        }

        self.stats.miss();
        let polygon = resolve_polygon(spec).map(Arc::new);
        self.entries
            .lock()
            .insert(key, CacheEntry::new(polygon.clone(), fingerprint));
        polygon
    }

    /// Force-drops one viewport's entry.
    pub fn invalidate(&self, layout: &LayoutId, viewport: ViewportId) {
        if self
            .entries
            .lock()
            .remove(&(layout.clone(), viewport))
            .is_some()
        {
            self.stats.invalidated(InvalidationReason::Explicit);
        }
    }

    /// Force-drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        if !entries.is_empty() {
            entries.clear();
            self.stats.invalidated(InvalidationReason::Explicit);
        }
        tracing::debug!(target = "keynote.cache", "viewport cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().len();
        self.stats.snapshot(entries)
    }
}
