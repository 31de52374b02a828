use std::fmt;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

use keynote_host::{DocumentStamp, ViewportSpec};

/// A stable SHA-256 fingerprint stored as a lowercase hex string.
///
/// Fingerprints detect whether a cached computation's inputs have changed;
/// equality is the only operation that matters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the SHA-256 fingerprint of an arbitrary byte slice.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes.as_ref());
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint of a document's validity stamp (mtime + revision).
    pub fn from_stamp(stamp: &DocumentStamp) -> Self {
        Self::from_bytes(stamp.to_bytes())
    }

    /// Fingerprint of everything that affects a viewport's resolved polygon
    /// (center, scale, rotation, clip boundary).
    pub fn from_viewport(spec: &ViewportSpec) -> Self {
        Self::from_bytes(spec.fingerprint_bytes())
    }

    /// Fast fingerprint based on file metadata (size + mtime).
    ///
    /// Used to validate cached scans of closed-on-disk documents without
    /// reading file contents. Mtimes before the epoch hash as zero.
    pub fn from_file_metadata(path: impl AsRef<Path>) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let len = meta.len();
        let modified_nanos: u128 = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        let mut bytes = Vec::with_capacity(8 + 16);
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&modified_nanos.to_le_bytes());
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn byte_fingerprints_are_deterministic() {
        assert_eq!(Fingerprint::from_bytes(b"abc"), Fingerprint::from_bytes(b"abc"));
        assert_ne!(Fingerprint::from_bytes(b"abc"), Fingerprint::from_bytes(b"abd"));
        assert_eq!(Fingerprint::from_bytes(b"abc").as_str().len(), 64);
    }

    #[test]
    fn file_metadata_fingerprint_tracks_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a").unwrap();
        file.flush().unwrap();
        let first = Fingerprint::from_file_metadata(file.path()).unwrap();

        writeln!(file, "more bytes").unwrap();
        file.flush().unwrap();
        let second = Fingerprint::from_file_metadata(file.path()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(Fingerprint::from_file_metadata("/no/such/file.dwg").is_err());
    }
}
