use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Lifecycle state of a source document at the moment of a request.
///
/// The engine only classifies; it never drives transitions. `Active` and
/// `Inactive` documents are borrowed from the host and never closed by the
/// engine; `Closed` documents are opened read-only into a scoped
/// representation and discarded afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingState {
    /// The document currently has input focus in the host.
    Active,
    /// Open in the host but not focused.
    Inactive,
    /// No in-memory representation; only a file on disk.
    Closed,
}

/// Identity of a source document: canonical path plus a session token.
///
/// The session token distinguishes "the same path, reopened" — an in-memory
/// document discards its caches when the host replaces it even if the path
/// is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    path: PathBuf,
    session: u64,
}

impl DocumentKey {
    pub fn new(path: impl Into<PathBuf>, session: u64) -> Self {
        Self {
            path: path.into(),
            session,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

/// Validity stamp for a document's scanned contents.
///
/// For closed files this tracks the on-disk mtime. For open documents the
/// mtime does not move until the user saves, so hosts bump `revision` on
/// every in-memory edit instead (the "dirty flag" path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStamp {
    modified: SystemTime,
    revision: u64,
}

impl DocumentStamp {
    pub fn new(modified: SystemTime, revision: u64) -> Self {
        Self { modified, revision }
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Canonical byte encoding used by the cache layer to derive a
    /// fingerprint. Mtimes before the epoch encode as zero.
    pub fn to_bytes(&self) -> [u8; 24] {
        let nanos: u128 = self
            .modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        let mut bytes = [0_u8; 24];
        bytes[..16].copy_from_slice(&nanos.to_le_bytes());
        bytes[16..].copy_from_slice(&self.revision.to_le_bytes());
        bytes
    }
}
