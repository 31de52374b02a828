use keynote_geom::{centroid, Point};
use keynote_host::{AnnotationEntity, DrawingAccess};

use crate::marker::{Marker, MarkerFilter, MarkerKind};
use crate::Result;

/// Upper bound on leader-line probe attempts per annotation.
///
/// Host object models expose leader lines by index and not every index is
/// materialized; probing is a bounded walk, not unbounded retry.
pub const MAX_LEADER_PROBES: usize = 8;

/// Scans an entire document's model space for note markers.
///
/// This enumerates every accepted annotation and tag-block instance exactly
/// once and is the expensive pass the marker cache memoizes. The result is
/// not tied to any sheet; containment against individual viewports happens
/// later.
///
/// Markers whose note text is absent or unparsable are included so callers
/// can audit them; the aggregator ignores them.
pub fn scan_markers(access: &dyn DrawingAccess, filter: &MarkerFilter) -> Result<Vec<Marker>> {
    let mut markers = Vec::new();
    let mut skipped_anchorless = 0_usize;

    for annotation in access.annotations()? {
        if !filter.accepts_style(&annotation.style) {
            continue;
        }

        let Some(anchor) = annotation_anchor(&annotation) else {
            // No leader vertex and no bounding frame: nothing to test
            // containment against.
            skipped_anchorless += 1;
            continue;
        };

        markers.push(Marker {
            kind: MarkerKind::Annotation,
            anchor,
            style: annotation.style,
            raw_note: annotation.note_text,
        });
    }

    for block in access.block_refs()? {
        let Some(attribute_key) = filter.attribute_key(&block.name) else {
            continue;
        };
        let raw_note = block.attributes.get(attribute_key).cloned();

        markers.push(Marker {
            kind: MarkerKind::TagBlock,
            anchor: block.insertion,
            style: block.name,
            raw_note,
        });
    }

    tracing::debug!(
        target = "keynote.scan",
        markers = markers.len(),
        skipped_anchorless,
        "scanned document for note markers"
    );
    Ok(markers)
}

/// Anchor point of an annotation: the first materialized leader vertex
/// (probing indices in order, capped), else the centroid of the bounding
/// frame, else nothing.
fn annotation_anchor(annotation: &AnnotationEntity) -> Option<Point> {
    annotation
        .leaders
        .iter()
        .take(MAX_LEADER_PROBES)
        .flatten()
        .copied()
        .find(|p| p.is_finite())
        .or_else(|| centroid(&annotation.frame?.corners()))
}
