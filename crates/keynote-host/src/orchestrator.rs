use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::access::DrawingAccess;
use crate::document::{DocumentKey, DocumentStamp, DrawingState};
use crate::Result;

/// Host lifecycle capability: identity, state classification, and handle
/// acquisition for source documents.
///
/// A concrete implementation adapts a real drawing application; tests use
/// the in-memory fake from `keynote-test-utils`.
pub trait DrawingHost: Send + Sync {
    /// Resolves a configured path to a document identity.
    ///
    /// Fails when the path cannot name a document at all (missing file and
    /// not open in the host).
    fn identity(&self, path: &Path) -> Result<DocumentKey>;

    /// Classifies the document's lifecycle state at this moment.
    fn classify(&self, key: &DocumentKey) -> DrawingState;

    /// Current validity stamp (mtime + in-memory revision counter).
    fn stamp(&self, key: &DocumentKey) -> Result<DocumentStamp>;

    /// Best-effort promotion of an inactive document to active, which can
    /// improve fidelity of downstream geometry reads. Returns whether the
    /// promotion happened; failure is not an error.
    fn activate(&self, _key: &DocumentKey) -> bool {
        false
    }

    /// Borrows the already-open in-memory representation. The engine never
    /// closes a borrowed document.
    fn borrow_open(&self, key: &DocumentKey) -> Result<Arc<dyn DrawingAccess>>;

    /// Opens an isolated, read-shared representation of a closed file.
    ///
    /// The returned access is dropped by the engine as soon as the read is
    /// done; implementations discard the representation in their `Drop`
    /// without writing anything back. Concurrent opens of *different* files
    /// must not interfere with each other.
    fn open_closed(&self, key: &DocumentKey) -> Result<Box<dyn DrawingAccess>>;
}

/// Scoped wrapper around a temporary read-only open of a closed file.
///
/// Dropping this drops the inner access, which is where the host
/// implementation tears the representation down. The wrapper exists so the
/// discard is visible in traces and so handles of both kinds expose one
/// `access()` surface.
pub struct ScopedDrawing {
    key: DocumentKey,
    // Option so Drop can release the access before logging.
    access: Option<Box<dyn DrawingAccess>>,
}

impl ScopedDrawing {
    pub fn new(key: DocumentKey, access: Box<dyn DrawingAccess>) -> Self {
        Self {
            key,
            access: Some(access),
        }
    }

    pub fn access(&self) -> &dyn DrawingAccess {
        // Invariant: `access` is only taken in Drop.
        self.access
            .as_deref()
            .unwrap_or_else(|| unreachable!("scoped drawing accessed after drop"))
    }
}

impl Drop for ScopedDrawing {
    fn drop(&mut self) {
        drop(self.access.take());
        tracing::debug!(
            target = "keynote.host",
            path = %self.key.path().display(),
            "discarded temporary read-only drawing"
        );
    }
}

/// A uniform read-only handle to a source document, whatever its state.
pub enum DrawingHandle {
    /// Backed by the host's in-memory representation; never closed here.
    Borrowed(Arc<dyn DrawingAccess>),
    /// Temporary open of a closed file; torn down when the handle drops.
    Scoped(ScopedDrawing),
}

impl DrawingHandle {
    pub fn access(&self) -> &dyn DrawingAccess {
        match self {
            DrawingHandle::Borrowed(access) => access.as_ref(),
            DrawingHandle::Scoped(scoped) => scoped.access(),
        }
    }
}

/// A source document resolved for one read pass.
pub struct ResolvedDocument {
    pub key: DocumentKey,
    pub stamp: DocumentStamp,
    pub state: DrawingState,
    pub handle: DrawingHandle,
}

impl ResolvedDocument {
    pub fn access(&self) -> &dyn DrawingAccess {
        self.handle.access()
    }
}

/// Classifies source documents and hands out uniform read-only handles.
///
/// All engine reads of a given document go through [`Orchestrator::with_document`],
/// which holds that document's lock for the duration of the closure — a
/// document cannot be re-resolved (and its temporary representation cannot
/// be torn down) while a scan against it is in flight. Different documents
/// do not contend.
pub struct Orchestrator<H> {
    host: Arc<H>,
    locks: Mutex<HashMap<DocumentKey, Arc<Mutex<()>>>>,
}

impl<H: DrawingHost> Orchestrator<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn document_lock(&self, key: &DocumentKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Resolves `path` and runs `f` with exclusive engine-side access to the
    /// document. A closed file is opened read-only for the duration of `f`
    /// and discarded before this returns, leaving disk contents and open
    /// documents untouched.
    pub fn with_document<T>(
        &self,
        path: &Path,
        f: impl FnOnce(&ResolvedDocument) -> T,
    ) -> Result<T> {
        let key = self.host.identity(path)?;
        let lock = self.document_lock(&key);
        let _guard = lock.lock();

        let mut state = self.host.classify(&key);
        if state == DrawingState::Inactive && self.host.activate(&key) {
            tracing::debug!(
                target = "keynote.host",
                path = %key.path().display(),
                "promoted inactive drawing to active"
            );
            state = DrawingState::Active;
        }

        let handle = match state {
            DrawingState::Active | DrawingState::Inactive => {
                DrawingHandle::Borrowed(self.host.borrow_open(&key)?)
            }
            DrawingState::Closed => {
                let access = self.host.open_closed(&key)?;
                DrawingHandle::Scoped(ScopedDrawing::new(key.clone(), access))
            }
        };
        let stamp = self.host.stamp(&key)?;

        let resolved = ResolvedDocument {
            key,
            stamp,
            state,
            handle,
        };
        Ok(f(&resolved))
    }
}
