use std::path::PathBuf;

use keynote_core::{LayoutId, NoteId, SheetId};
use keynote_host::ViewportSpec;

use crate::error::SheetError;

/// One sheet to populate: its identity, the layout that owns its viewports,
/// the source drawing whose model space carries the markers, and the
/// viewport set to test containment against.
#[derive(Debug, Clone)]
pub struct SheetRequest {
    pub sheet: SheetId,
    pub layout: LayoutId,
    pub source: PathBuf,
    pub viewports: Vec<ViewportSpec>,
}

/// The notes detected for one sheet, sorted ascending (numeric).
///
/// Always computed fresh per request (only its inputs are cached), so
/// re-running an unchanged sheet yields an identical result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNoteResult {
    pub sheet: SheetId,
    pub notes: Vec<NoteId>,
}

/// Per-sheet outcome: the (possibly empty) result plus the contained error
/// when the sheet's source document could not be read.
#[derive(Debug, Clone)]
pub struct SheetOutcome {
    pub result: SheetNoteResult,
    pub error: Option<SheetError>,
}

impl SheetOutcome {
    pub(crate) fn ok(sheet: SheetId, notes: Vec<NoteId>) -> Self {
        Self {
            result: SheetNoteResult { sheet, notes },
            error: None,
        }
    }

    pub(crate) fn failed(sheet: SheetId, error: SheetError) -> Self {
        Self {
            result: SheetNoteResult {
                sheet,
                notes: Vec::new(),
            },
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of one batch run.
///
/// Outcomes appear in request order. A cancelled run reports the outcomes
/// of the sheet-groups that completed before the cancellation point and
/// sets `cancelled`; sheets that were never reached have no outcome.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SheetOutcome>,
    pub cancelled: bool,
}

impl BatchReport {
    /// The outcome for `sheet`, if that sheet was processed.
    pub fn outcome(&self, sheet: &SheetId) -> Option<&SheetOutcome> {
        self.outcomes.iter().find(|o| o.result.sheet == *sheet)
    }
}
