pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors produced while scanning a document for markers.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("host read failed: {0}")]
    Host(#[from] keynote_host::HostError),
}
