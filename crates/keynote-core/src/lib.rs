//! Core shared types for the Keynote engine.
//!
//! This crate is intentionally small: identifier newtypes, the numeric note
//! identifier, and the serde config types handed over by the configuration
//! collaborator. Everything with behavior lives in the downstream crates.

mod config;
mod ids;
mod note;

pub use config::{NoteProjectConfig, SheetSourceConfig, TagBlockConfig};
pub use ids::{LayoutId, SheetId, ViewportId};
pub use note::{NoteId, NoteIdParseError};
