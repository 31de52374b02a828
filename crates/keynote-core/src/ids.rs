use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a drawing sheet as the configuration names it.
///
/// Sheets are external identities (sheet-set names, layout titles); the
/// engine only carries them through to the result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(String);

impl SheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SheetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of the paper-space layout that owns a sheet's viewports.
///
/// Layout names are only unique within one drawing, so callers are expected
/// to qualify them (e.g. `"plans.dwg::C-101"`). The engine treats the value
/// as opaque; it is one half of the viewport cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(String);

impl LayoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for LayoutId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stable identity of one viewport within its layout, as assigned by the
/// host application (object handle, entity id, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ViewportId(u64);

impl ViewportId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
