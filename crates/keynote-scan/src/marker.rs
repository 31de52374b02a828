use std::collections::{BTreeMap, BTreeSet};

use keynote_core::{NoteId, NoteProjectConfig};
use keynote_geom::Point;

/// How a marker was placed in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// A style-tagged annotation (leadered note).
    Annotation,
    /// A tag-block instance carrying the note number in an attribute.
    TagBlock,
}

/// One detected note marker, anchored in shared model space.
///
/// Markers are immutable snapshots: a scanned batch belongs to exactly one
/// document stamp and is shared read-only between sheets. Markers whose
/// note text is missing or unparsable are kept (auditing tools want to see
/// them); [`Marker::note`] returns `None` for those and the aggregator
/// skips them.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub anchor: Point,
    /// Annotation style name, or the block name for tag blocks.
    pub style: String,
    pub raw_note: Option<String>,
}

impl Marker {
    /// The parsed note identifier, if the raw text names one.
    pub fn note(&self) -> Option<NoteId> {
        self.raw_note.as_deref()?.parse().ok()
    }
}

/// Accepted marker sources: annotation styles and tag-block/attribute pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerFilter {
    styles: BTreeSet<String>,
    /// Block name -> attribute key holding the note number.
    tag_blocks: BTreeMap<String, String>,
}

impl MarkerFilter {
    pub fn new(
        styles: impl IntoIterator<Item = String>,
        tag_blocks: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            styles: styles.into_iter().collect(),
            tag_blocks: tag_blocks.into_iter().collect(),
        }
    }

    pub fn from_config(config: &NoteProjectConfig) -> Self {
        Self::new(
            config.marker_styles.iter().cloned(),
            config
                .tag_blocks
                .iter()
                .map(|tb| (tb.block_name.clone(), tb.attribute_key.clone())),
        )
    }

    pub fn accepts_style(&self, style: &str) -> bool {
        self.styles.contains(style)
    }

    /// The attribute key carrying the note number for `block`, if accepted.
    pub fn attribute_key(&self, block: &str) -> Option<&str> {
        self.tag_blocks.get(block).map(String::as_str)
    }

    pub fn accepts(&self, marker: &Marker) -> bool {
        match marker.kind {
            MarkerKind::Annotation => self.accepts_style(&marker.style),
            MarkerKind::TagBlock => self.tag_blocks.contains_key(&marker.style),
        }
    }
}
