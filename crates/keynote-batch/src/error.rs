use std::fmt;
use std::sync::Arc;

use keynote_scan::ScanError;

/// A contained per-sheet failure.
///
/// These never abort the batch; they ride along in the sheet's outcome so
/// callers can surface which sheets were skipped and why. The inner error is
/// shared because one unresolvable document fails every sheet in its group.
#[derive(Debug, Clone)]
pub struct SheetError {
    inner: Arc<ScanError>,
}

impl SheetError {
    pub(crate) fn new(error: ScanError) -> Self {
        Self {
            inner: Arc::new(error),
        }
    }

    pub(crate) fn shared(inner: &Arc<ScanError>) -> Self {
        Self {
            inner: Arc::clone(inner),
        }
    }
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Batch-level failures.
///
/// Per-document and per-sheet problems are contained as [`SheetError`]s;
/// only a total inability to process any sheet surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("no sheet in the batch could be processed ({failed} failed)")]
    AllSheetsFailed { failed: usize },
}
