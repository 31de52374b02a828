//! Test utilities shared across the Keynote workspace.
//!
//! [`FakeHost`] is an in-memory [`DrawingHost`] with scripted documents. It
//! counts entity reads and live scoped opens so tests can assert the two
//! properties the engine promises: the full-document scan runs at most once
//! per document per batch, and temporary opens of closed files never leak.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use keynote_geom::Point;
use keynote_host::{
    AnnotationEntity, BlockRefEntity, DocumentKey, DocumentStamp, DrawingAccess, DrawingHost,
    DrawingState, HostError, Result,
};

#[derive(Debug)]
struct FakeDocument {
    session: u64,
    state: Mutex<DrawingState>,
    activatable: AtomicBool,
    fail_open: AtomicBool,
    modified: Mutex<SystemTime>,
    revision: AtomicU64,
    annotations: Mutex<Vec<AnnotationEntity>>,
    blocks: Mutex<Vec<BlockRefEntity>>,
    scan_calls: AtomicUsize,
    scoped_open: AtomicUsize,
}

impl FakeDocument {
    fn new(session: u64, state: DrawingState) -> Self {
        Self {
            session,
            state: Mutex::new(state),
            activatable: AtomicBool::new(false),
            fail_open: AtomicBool::new(false),
            modified: Mutex::new(UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            revision: AtomicU64::new(0),
            annotations: Mutex::new(Vec::new()),
            blocks: Mutex::new(Vec::new()),
            scan_calls: AtomicUsize::new(0),
            scoped_open: AtomicUsize::new(0),
        }
    }
}

struct FakeAccess {
    doc: Arc<FakeDocument>,
}

impl DrawingAccess for FakeAccess {
    fn annotations(&self) -> Result<Vec<AnnotationEntity>> {
        // One scan pass reads annotations exactly once; count that as the
        // injected call counter for scan-once assertions.
        self.doc.scan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.doc.annotations.lock().clone())
    }

    fn block_refs(&self) -> Result<Vec<BlockRefEntity>> {
        Ok(self.doc.blocks.lock().clone())
    }
}

/// Scoped access whose drop mirrors the host discarding a temporary open.
struct ScopedFakeAccess {
    inner: FakeAccess,
}

impl DrawingAccess for ScopedFakeAccess {
    fn annotations(&self) -> Result<Vec<AnnotationEntity>> {
        self.inner.annotations()
    }

    fn block_refs(&self) -> Result<Vec<BlockRefEntity>> {
        self.inner.block_refs()
    }
}

impl Drop for ScopedFakeAccess {
    fn drop(&mut self) {
        self.inner.doc.scoped_open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory drawing host with scripted documents.
#[derive(Default)]
pub struct FakeHost {
    documents: Mutex<HashMap<PathBuf, Arc<FakeDocument>>>,
    next_session: AtomicU64,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document at `path` in the given lifecycle state.
    pub fn insert(&self, path: impl Into<PathBuf>, state: DrawingState) {
        let session = self.next_session.fetch_add(1, Ordering::SeqCst) + 1;
        self.documents
            .lock()
            .insert(path.into(), Arc::new(FakeDocument::new(session, state)));
    }

    fn document(&self, path: &Path) -> Result<Arc<FakeDocument>> {
        self.documents
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn document_for_key(&self, key: &DocumentKey) -> Result<Arc<FakeDocument>> {
        self.document(key.path())
    }

    pub fn set_annotations(&self, path: impl AsRef<Path>, annotations: Vec<AnnotationEntity>) {
        let doc = self.document(path.as_ref()).expect("unknown fake document");
        *doc.annotations.lock() = annotations;
    }

    pub fn set_blocks(&self, path: impl AsRef<Path>, blocks: Vec<BlockRefEntity>) {
        let doc = self.document(path.as_ref()).expect("unknown fake document");
        *doc.blocks.lock() = blocks;
    }

    pub fn set_state(&self, path: impl AsRef<Path>, state: DrawingState) {
        let doc = self.document(path.as_ref()).expect("unknown fake document");
        *doc.state.lock() = state;
    }

    /// Marks the document as edited in memory (bumps the revision counter,
    /// which changes its stamp without touching the mtime — the dirty
    /// active-document path).
    pub fn touch(&self, path: impl AsRef<Path>) {
        let doc = self.document(path.as_ref()).expect("unknown fake document");
        doc.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes `open_closed` fail, simulating a locked or corrupt file.
    pub fn set_fail_open(&self, path: impl AsRef<Path>, fail: bool) {
        let doc = self.document(path.as_ref()).expect("unknown fake document");
        doc.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Allows `activate` to succeed for this document.
    pub fn set_activatable(&self, path: impl AsRef<Path>, activatable: bool) {
        let doc = self.document(path.as_ref()).expect("unknown fake document");
        doc.activatable.store(activatable, Ordering::SeqCst);
    }

    /// Number of annotation enumerations performed against this document —
    /// the injected call counter for at-most-one-scan assertions.
    pub fn scan_count(&self, path: impl AsRef<Path>) -> usize {
        self.document(path.as_ref())
            .map(|doc| doc.scan_calls.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of currently live temporary opens of this closed document.
    pub fn live_scoped_opens(&self, path: impl AsRef<Path>) -> usize {
        self.document(path.as_ref())
            .map(|doc| doc.scoped_open.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

impl DrawingHost for FakeHost {
    fn identity(&self, path: &Path) -> Result<DocumentKey> {
        let doc = self.document(path)?;
        Ok(DocumentKey::new(path, doc.session))
    }

    fn classify(&self, key: &DocumentKey) -> DrawingState {
        self.document_for_key(key)
            .map(|doc| *doc.state.lock())
            .unwrap_or(DrawingState::Closed)
    }

    fn stamp(&self, key: &DocumentKey) -> Result<DocumentStamp> {
        let doc = self.document_for_key(key)?;
        let modified = *doc.modified.lock();
        Ok(DocumentStamp::new(
            modified,
            doc.revision.load(Ordering::SeqCst),
        ))
    }

    fn activate(&self, key: &DocumentKey) -> bool {
        let Ok(doc) = self.document_for_key(key) else {
            return false;
        };
        if doc.activatable.load(Ordering::SeqCst) {
            *doc.state.lock() = DrawingState::Active;
            true
        } else {
            false
        }
    }

    fn borrow_open(&self, key: &DocumentKey) -> Result<Arc<dyn DrawingAccess>> {
        let doc = self.document_for_key(key)?;
        if *doc.state.lock() == DrawingState::Closed {
            return Err(HostError::NotOpen {
                path: key.path().to_path_buf(),
            });
        }
        Ok(Arc::new(FakeAccess { doc }))
    }

    fn open_closed(&self, key: &DocumentKey) -> Result<Box<dyn DrawingAccess>> {
        let doc = self.document_for_key(key)?;
        if doc.fail_open.load(Ordering::SeqCst) {
            return Err(HostError::Open {
                path: key.path().to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "file locked"),
            });
        }
        doc.scoped_open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScopedFakeAccess {
            inner: FakeAccess { doc },
        }))
    }
}

/// Convenience constructor for a leadered note annotation.
pub fn note_annotation(style: &str, anchor: Point, note: &str) -> AnnotationEntity {
    AnnotationEntity {
        style: style.into(),
        leaders: vec![Some(anchor)],
        frame: None,
        note_text: Some(note.into()),
    }
}
