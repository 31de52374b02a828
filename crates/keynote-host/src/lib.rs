//! Host application seam for the Keynote engine.
//!
//! The engine never talks to a concrete drawing application. Everything it
//! needs is expressed as two small capabilities:
//! - [`DrawingAccess`]: read-only entity enumeration for one drawing.
//! - [`DrawingHost`]: document identity, lifecycle classification
//!   (active / open-but-inactive / closed-on-disk) and handle acquisition.
//!
//! The [`Orchestrator`] builds on those to hand callers a uniform read-only
//! view of a source document regardless of its state, with a scoped,
//! teardown-on-drop representation for the closed case.

mod access;
mod document;
mod entity;
mod error;
mod orchestrator;

pub use access::DrawingAccess;
pub use document::{DocumentKey, DocumentStamp, DrawingState};
pub use entity::{AnnotationEntity, BlockRefEntity, ViewportSpec};
pub use error::{HostError, Result};
pub use orchestrator::{DrawingHandle, DrawingHost, Orchestrator, ResolvedDocument, ScopedDrawing};
