use std::borrow::Borrow;
use std::collections::BTreeSet;

use keynote_core::NoteId;

use crate::marker::{Marker, MarkerFilter};
use crate::viewport::ViewportPolygon;

/// Intersects a document's markers against one sheet's viewport polygons.
///
/// A sheet's viewports form a union of regions: a marker counts if its
/// anchor is inside *any* of them. Note identifiers are deduplicated (two
/// markers may carry the same note, and overlapping viewports may both see
/// one marker) and returned ascending in numeric order. Markers that are
/// not accepted by `filter` or carry no parsable note contribute nothing.
pub fn notes_for_sheet<P: Borrow<ViewportPolygon>>(
    markers: &[Marker],
    polygons: &[P],
    filter: &MarkerFilter,
) -> Vec<NoteId> {
    let mut notes = BTreeSet::new();

    for marker in markers {
        if !filter.accepts(marker) {
            continue;
        }
        let Some(note) = marker.note() else {
            continue;
        };
        if polygons
            .iter()
            .any(|polygon| polygon.borrow().contains(marker.anchor))
        {
            notes.insert(note);
        }
    }

    notes.into_iter().collect()
}
