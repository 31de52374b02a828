//! Marker detection for the Keynote engine.
//!
//! Three pieces, matching the shape of the problem:
//! - [`scan_markers`]: one full-document enumeration of note markers. This
//!   is the expensive pass the cache layer exists to avoid repeating.
//! - [`resolve_polygon`]: one viewport's paper-space clip mapped into a
//!   closed polygon in shared model coordinates.
//! - [`notes_for_sheet`]: containment of markers against a sheet's polygon
//!   set, deduplicated and numerically sorted.

mod aggregate;
mod error;
mod marker;
mod scanner;
mod viewport;

pub use aggregate::notes_for_sheet;
pub use error::{Result, ScanError};
pub use marker::{Marker, MarkerFilter, MarkerKind};
pub use scanner::{scan_markers, MAX_LEADER_PROBES};
pub use viewport::{resolve_polygon, ViewportPolygon};
