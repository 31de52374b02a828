//! Memoization layer for the Keynote engine.
//!
//! Two independent caches sit between the batch processor and the expensive
//! reads:
//! - [`MarkerCache`]: one full-document marker scan per document, keyed by
//!   document identity and validated by a stamp fingerprint. Guarantees at
//!   most one concurrent scan per document.
//! - [`ViewportCache`]: one resolved polygon per (layout, viewport),
//!   validated by a fingerprint over the viewport's view properties.
//!
//! Eviction is correctness-driven only: a stale entry is dropped on the
//! access that notices it, never served. Both caches expose statistics and
//! explicit clears for operator tooling.

mod entry;
mod fingerprint;
mod marker_cache;
mod viewport_cache;

pub use entry::{CacheEntry, CacheStats, InvalidationReason};
pub use fingerprint::Fingerprint;
pub use marker_cache::MarkerCache;
pub use viewport_cache::ViewportCache;
