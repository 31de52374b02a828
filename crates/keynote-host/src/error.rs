use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, HostError>;

/// Errors produced while resolving or reading host documents.
///
/// These are *resolution errors* in the engine's taxonomy: the batch layer
/// contains them per document and keeps processing other sheets.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("drawing not found: {path}")]
    NotFound { path: PathBuf },

    #[error("drawing is not open in the host: {path}")]
    NotOpen { path: PathBuf },

    #[error("failed to open drawing {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("host rejected entity read: {message}")]
    EntityRead { message: String },
}
