use crate::entity::{AnnotationEntity, BlockRefEntity};
use crate::Result;

/// Read-only entity enumeration for one drawing.
///
/// The trait is intentionally small so it can be implemented for different
/// backends (a live host document, a temporary side-database opened from
/// disk, or an in-memory fake in tests). Implementations must be safe to
/// call from worker threads; the engine serializes access per document at
/// the orchestrator level.
pub trait DrawingAccess: Send + Sync {
    /// All style-tagged annotation objects in the drawing's model space.
    fn annotations(&self) -> Result<Vec<AnnotationEntity>>;

    /// All block instances in the drawing's model space.
    fn block_refs(&self) -> Result<Vec<BlockRefEntity>>;
}
