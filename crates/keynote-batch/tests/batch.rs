//! End-to-end batch runs against the in-memory fake host.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use keynote_batch::{BatchError, BatchProcessor, CancellationToken, SheetRequest};
use keynote_cache::InvalidationReason;
use keynote_core::{LayoutId, NoteId, SheetId, ViewportId};
use keynote_geom::Point;
use keynote_host::{
    BlockRefEntity, DocumentKey, DocumentStamp, DrawingAccess, DrawingHost, DrawingState,
    ViewportSpec,
};
use keynote_scan::MarkerFilter;
use keynote_test_utils::{note_annotation, FakeHost};

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("keynote=trace")
        .try_init();
}

fn filter() -> MarkerFilter {
    MarkerFilter::new(
        ["NOTE-TAG".to_string()],
        [("KEYNOTE".to_string(), "NUM".to_string())],
    )
}

fn note(raw: u32) -> NoteId {
    NoteId::new(raw).unwrap()
}

/// An 8x6 paper viewport at 1:100 looking at model (500, 500): it shows the
/// model region x in [100, 900], y in [200, 800].
fn viewport(id: u64) -> ViewportSpec {
    ViewportSpec {
        id: ViewportId::new(id),
        view_center: Point::new(500.0, 500.0),
        custom_scale: 0.01,
        twist: 0.0,
        center: Point::new(4.0, 3.0),
        width: 8.0,
        height: 6.0,
        clip: None,
    }
}

fn request(sheet: &str, layout: &str, source: &str, viewports: Vec<ViewportSpec>) -> SheetRequest {
    SheetRequest {
        sheet: SheetId::new(sheet),
        layout: LayoutId::new(layout),
        source: PathBuf::from(source),
        viewports,
    }
}

fn tag_block(num: &str, insertion: Point) -> BlockRefEntity {
    BlockRefEntity {
        name: "KEYNOTE".into(),
        insertion,
        attributes: BTreeMap::from([("NUM".to_string(), num.to_string())]),
    }
}

/// Populates `path` with markers 3 and 7 (annotations) and 12 (tag block)
/// inside the standard viewport, plus noise that must not surface.
fn seed_markers(host: &FakeHost, path: &str) {
    host.set_annotations(
        path,
        vec![
            note_annotation("NOTE-TAG", Point::new(500.0, 500.0), "7"),
            note_annotation("NOTE-TAG", Point::new(150.0, 250.0), "3"),
            note_annotation("NOTE-TAG", Point::new(2000.0, 2000.0), "5"),
            note_annotation("NOTE-TAG", Point::new(400.0, 400.0), "A1"),
            note_annotation("TITLE", Point::new(400.0, 400.0), "9"),
        ],
    );
    host.set_blocks(
        path,
        vec![
            tag_block("12", Point::new(800.0, 700.0)),
            tag_block("40", Point::new(5000.0, 5000.0)),
        ],
    );
}

#[test]
fn detects_notes_inside_sheet_viewports() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [request(
        "C-101",
        "site.dwg::C-101",
        "/plans/site.dwg",
        vec![viewport(1)],
    )];

    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    assert!(!report.cancelled);
    assert_eq!(report.outcomes.len(), 1);

    let outcome = report.outcome(&SheetId::new("C-101")).unwrap();
    assert!(!outcome.is_failed());
    assert_eq!(outcome.result.notes, vec![note(3), note(7), note(12)]);
}

#[test]
fn scan_runs_once_per_document_and_is_reused_across_batches() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [
        request("C-101", "site.dwg::C-101", "/plans/site.dwg", vec![viewport(1)]),
        request("C-102", "site.dwg::C-102", "/plans/site.dwg", vec![viewport(2)]),
    ];

    processor.run(&requests, &CancellationToken::new()).unwrap();
    assert_eq!(host.scan_count("/plans/site.dwg"), 1);

    // The document did not change: the second batch recomputes nothing.
    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    assert_eq!(host.scan_count("/plans/site.dwg"), 1);
    assert_eq!(report.outcomes.len(), 2);

    let markers = processor.marker_cache().stats();
    assert_eq!((markers.misses, markers.hits), (1, 1));
    let viewports = processor.viewport_cache().stats();
    assert_eq!((viewports.misses, viewports.hits), (2, 2));
}

#[test]
fn edited_document_is_rescanned() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [request(
        "C-101",
        "site.dwg::C-101",
        "/plans/site.dwg",
        vec![viewport(1)],
    )];

    processor.run(&requests, &CancellationToken::new()).unwrap();

    // In-memory edit: a new annotation lands inside the viewport and the
    // revision counter moves, invalidating the marker-set entry.
    host.set_annotations(
        "/plans/site.dwg",
        vec![
            note_annotation("NOTE-TAG", Point::new(500.0, 500.0), "7"),
            note_annotation("NOTE-TAG", Point::new(300.0, 300.0), "2"),
        ],
    );
    host.touch("/plans/site.dwg");

    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    assert_eq!(host.scan_count("/plans/site.dwg"), 2);
    assert_eq!(
        processor.marker_cache().stats().last_invalidation,
        Some(InvalidationReason::Stale)
    );

    // Blocks were untouched, so note 12 is still present.
    let outcome = report.outcome(&SheetId::new("C-101")).unwrap();
    assert_eq!(outcome.result.notes, vec![note(2), note(7), note(12)]);
}

#[test]
fn viewport_change_invalidates_only_that_entry() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let wide = request(
        "C-101",
        "site.dwg::C-101",
        "/plans/site.dwg",
        vec![viewport(1)],
    );
    let report = processor.run(&[wide], &CancellationToken::new()).unwrap();
    assert_eq!(
        report.outcomes[0].result.notes,
        vec![note(3), note(7), note(12)]
    );

    // Zooming in to 1:50 halves the shown region; notes 3 and 12 fall out.
    let mut zoomed_viewport = viewport(1);
    zoomed_viewport.custom_scale = 0.02;
    let zoomed = request(
        "C-101",
        "site.dwg::C-101",
        "/plans/site.dwg",
        vec![zoomed_viewport],
    );

    let report = processor.run(&[zoomed], &CancellationToken::new()).unwrap();
    assert_eq!(report.outcomes[0].result.notes, vec![note(7)]);

    // Only the viewport entry was invalidated; the marker scan survived.
    assert_eq!(host.scan_count("/plans/site.dwg"), 1);
    assert_eq!(processor.viewport_cache().stats().invalidations, 1);
    assert_eq!(processor.marker_cache().stats().invalidations, 0);
}

#[test]
fn missing_source_is_contained_and_batch_continues() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [
        request("C-000", "gone.dwg::C-000", "/plans/gone.dwg", vec![viewport(9)]),
        request("C-101", "site.dwg::C-101", "/plans/site.dwg", vec![viewport(1)]),
    ];

    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    assert_eq!(report.outcomes.len(), 2);

    let missing = report.outcome(&SheetId::new("C-000")).unwrap();
    assert!(missing.is_failed());
    assert!(missing.result.notes.is_empty());

    let good = report.outcome(&SheetId::new("C-101")).unwrap();
    assert!(!good.is_failed());
    assert_eq!(good.result.notes, vec![note(3), note(7), note(12)]);
}

#[test]
fn unreadable_closed_file_fails_only_its_group() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/locked.dwg", DrawingState::Closed);
    host.set_fail_open("/plans/locked.dwg", true);
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [
        request("C-201", "locked.dwg::C-201", "/plans/locked.dwg", vec![viewport(1)]),
        request("C-202", "locked.dwg::C-202", "/plans/locked.dwg", vec![viewport(2)]),
        request("C-101", "site.dwg::C-101", "/plans/site.dwg", vec![viewport(1)]),
    ];

    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    assert!(report.outcome(&SheetId::new("C-201")).unwrap().is_failed());
    assert!(report.outcome(&SheetId::new("C-202")).unwrap().is_failed());
    assert!(!report.outcome(&SheetId::new("C-101")).unwrap().is_failed());
}

#[test]
fn all_sheets_failing_fails_the_batch() {
    trace_init();
    let host = Arc::new(FakeHost::new());

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [
        request("C-000", "gone.dwg::C-000", "/plans/gone.dwg", vec![viewport(1)]),
        request("C-001", "gone.dwg::C-001", "/plans/gone.dwg", vec![viewport(2)]),
    ];

    let err = processor
        .run(&requests, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, BatchError::AllSheetsFailed { failed: 2 }));

    // An empty batch is not a failure.
    let report = processor.run(&[], &CancellationToken::new()).unwrap();
    assert!(report.outcomes.is_empty());
}

#[test]
fn outcomes_follow_request_order() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/a.dwg", DrawingState::Active);
    host.insert("/plans/b.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/a.dwg");
    seed_markers(&host, "/plans/b.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    // Interleaved sources: grouping must not reorder the report.
    let requests = [
        request("S-1", "a.dwg::L1", "/plans/a.dwg", vec![viewport(1)]),
        request("S-2", "b.dwg::L1", "/plans/b.dwg", vec![viewport(1)]),
        request("S-3", "a.dwg::L2", "/plans/a.dwg", vec![viewport(2)]),
    ];

    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    let order: Vec<&str> = report
        .outcomes
        .iter()
        .map(|o| o.result.sheet.as_str())
        .collect();
    assert_eq!(order, ["S-1", "S-2", "S-3"]);
    assert_eq!(host.scan_count("/plans/a.dwg"), 1);
    assert_eq!(host.scan_count("/plans/b.dwg"), 1);
}

#[test]
fn closed_documents_are_read_scoped_and_released() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/archive.dwg", DrawingState::Closed);
    seed_markers(&host, "/plans/archive.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [request(
        "C-301",
        "archive.dwg::C-301",
        "/plans/archive.dwg",
        vec![viewport(1)],
    )];

    let report = processor.run(&requests, &CancellationToken::new()).unwrap();
    assert_eq!(
        report.outcomes[0].result.notes,
        vec![note(3), note(7), note(12)]
    );
    // The temporary read-only representation never outlives the scan.
    assert_eq!(host.live_scoped_opens("/plans/archive.dwg"), 0);
}

/// Host wrapper that cancels the batch while its first document is being
/// read, so the second sheet-group observes the cancellation.
struct CancelOnFirstRead {
    inner: FakeHost,
    token: CancellationToken,
}

impl DrawingHost for CancelOnFirstRead {
    fn identity(&self, path: &std::path::Path) -> keynote_host::Result<DocumentKey> {
        self.inner.identity(path)
    }

    fn classify(&self, key: &DocumentKey) -> DrawingState {
        self.inner.classify(key)
    }

    fn stamp(&self, key: &DocumentKey) -> keynote_host::Result<DocumentStamp> {
        self.inner.stamp(key)
    }

    fn borrow_open(&self, key: &DocumentKey) -> keynote_host::Result<Arc<dyn DrawingAccess>> {
        self.token.cancel();
        self.inner.borrow_open(key)
    }

    fn open_closed(&self, key: &DocumentKey) -> keynote_host::Result<Box<dyn DrawingAccess>> {
        self.inner.open_closed(key)
    }
}

#[test]
fn cancellation_between_groups_keeps_completed_outcomes() {
    trace_init();
    let inner = FakeHost::new();
    inner.insert("/plans/a.dwg", DrawingState::Active);
    inner.insert("/plans/b.dwg", DrawingState::Active);
    seed_markers(&inner, "/plans/a.dwg");
    seed_markers(&inner, "/plans/b.dwg");

    let token = CancellationToken::new();
    let host = Arc::new(CancelOnFirstRead {
        inner,
        token: token.clone(),
    });

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let requests = [
        request("S-1", "a.dwg::L1", "/plans/a.dwg", vec![viewport(1)]),
        request("S-2", "b.dwg::L1", "/plans/b.dwg", vec![viewport(1)]),
    ];

    let report = processor.run(&requests, &token).unwrap();
    assert!(report.cancelled);

    // The first group had already completed; the second was never reached.
    assert_eq!(report.outcomes.len(), 1);
    assert!(!report.outcomes[0].is_failed());
    assert_eq!(report.outcomes[0].result.sheet, SheetId::new("S-1"));
    assert!(report.outcome(&SheetId::new("S-2")).is_none());
    assert_eq!(host.inner.scan_count("/plans/b.dwg"), 0);
}

#[test]
fn pre_cancelled_batch_does_nothing() {
    trace_init();
    let host = Arc::new(FakeHost::new());
    host.insert("/plans/site.dwg", DrawingState::Active);
    seed_markers(&host, "/plans/site.dwg");

    let processor = BatchProcessor::new(Arc::clone(&host), filter());
    let token = CancellationToken::new();
    token.cancel();

    let requests = [request(
        "C-101",
        "site.dwg::C-101",
        "/plans/site.dwg",
        vec![viewport(1)],
    )];
    let report = processor.run(&requests, &token).unwrap();
    assert!(report.cancelled);
    assert!(report.outcomes.is_empty());
    assert_eq!(host.scan_count("/plans/site.dwg"), 0);
}
