use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ids::{LayoutId, SheetId};

/// A tag-block marker source: instances of `block_name` carry their note
/// number in the attribute named `attribute_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBlockConfig {
    pub block_name: String,
    pub attribute_key: String,
}

/// Where one sheet's markers come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSourceConfig {
    pub sheet: SheetId,
    /// Layout owning the sheet's viewports; half of the viewport cache key.
    pub layout: LayoutId,
    /// Path of the drawing whose model space is scanned for markers.
    pub source: PathBuf,
}

/// Per-project note detection configuration, as handed over by the
/// configuration collaborator. Loading this from disk is out of scope here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteProjectConfig {
    /// Annotation styles that mark a construction note.
    #[serde(default)]
    pub marker_styles: BTreeSet<String>,
    /// Tag blocks that mark a construction note.
    #[serde(default)]
    pub tag_blocks: Vec<TagBlockConfig>,
    /// Sheet-to-source mapping for batch runs.
    #[serde(default)]
    pub sheets: Vec<SheetSourceConfig>,
}
