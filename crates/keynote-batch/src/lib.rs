//! Batch processing for the Keynote engine.
//!
//! [`BatchProcessor`] is the top-level entry point: given N requested
//! sheets it groups them by resolved source document so each document's
//! full marker scan runs at most once per batch, then drives the
//! containment filter per sheet on a worker pool. Per-sheet failures are
//! contained; only a batch in which no sheet produced a result fails as a
//! whole.

mod cancel;
mod error;
mod pool;
mod processor;
mod request;

pub use cancel::CancellationToken;
pub use error::{BatchError, SheetError};
pub use processor::{BatchConfig, BatchProcessor};
pub use request::{BatchReport, SheetNoteResult, SheetOutcome, SheetRequest};
