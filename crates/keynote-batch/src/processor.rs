use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use keynote_cache::{Fingerprint, MarkerCache, ViewportCache};
use keynote_host::{DocumentKey, DrawingHost, Orchestrator};
use keynote_scan::{notes_for_sheet, scan_markers, Marker, MarkerFilter, ScanError};

use crate::cancel::CancellationToken;
use crate::error::{BatchError, SheetError};
use crate::pool::WorkerPool;
use crate::request::{BatchReport, SheetOutcome, SheetRequest};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        // Conservative default: batches are dominated by host reads, and
        // short-lived runs should not exhaust OS thread limits.
        Self {
            worker_threads: available.clamp(1, 8),
        }
    }
}

/// Top-level entry point: detects the notes for a batch of sheets.
///
/// Requests are grouped by resolved source-document identity so the
/// expensive full-document marker scan runs at most once per document per
/// batch (and, via [`MarkerCache`], at most once across batches until the
/// document changes). Sheets within a group are independent once the
/// document's marker list exists and run on the worker pool.
pub struct BatchProcessor<H> {
    orchestrator: Orchestrator<H>,
    markers: MarkerCache,
    viewports: ViewportCache,
    filter: MarkerFilter,
    pool: WorkerPool,
}

impl<H: DrawingHost> BatchProcessor<H> {
    pub fn new(host: Arc<H>, filter: MarkerFilter) -> Self {
        Self::with_config(host, filter, BatchConfig::default())
    }

    pub fn with_config(host: Arc<H>, filter: MarkerFilter, config: BatchConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(host),
            markers: MarkerCache::new(),
            viewports: ViewportCache::new(),
            filter,
            pool: WorkerPool::new(config.worker_threads),
        }
    }

    /// Diagnostic access to the marker-set cache (stats, explicit clears).
    pub fn marker_cache(&self) -> &MarkerCache {
        &self.markers
    }

    /// Diagnostic access to the viewport-polygon cache.
    pub fn viewport_cache(&self) -> &ViewportCache {
        &self.viewports
    }

    /// Processes a batch of sheet requests.
    ///
    /// Per-sheet failures are contained in the report; `Err` is returned
    /// only when every requested sheet failed. Cancellation is honored
    /// between sheet-groups: completed outcomes are kept, unreached sheets
    /// get none, and an in-flight scan still populates the cache.
    pub fn run(
        &self,
        requests: &[SheetRequest],
        token: &CancellationToken,
    ) -> Result<BatchReport, BatchError> {
        let outcomes: Mutex<Vec<Option<SheetOutcome>>> = Mutex::new(vec![None; requests.len()]);

        // Group by resolved identity, preserving first-appearance order.
        let mut groups: Vec<(DocumentKey, Vec<usize>)> = Vec::new();
        let mut group_of: HashMap<DocumentKey, usize> = HashMap::new();
        for (index, request) in requests.iter().enumerate() {
            match self.orchestrator.host().identity(&request.source) {
                Ok(key) => {
                    let slot = *group_of.entry(key.clone()).or_insert_with(|| {
                        groups.push((key, Vec::new()));
                        groups.len() - 1
                    });
                    groups[slot].1.push(index);
                }
                Err(err) => {
                    tracing::warn!(
                        target = "keynote.batch",
                        sheet = %request.sheet,
                        source = %request.source.display(),
                        error = %err,
                        "source document unresolvable; sheet yields no notes"
                    );
                    outcomes.lock()[index] = Some(SheetOutcome::failed(
                        request.sheet.clone(),
                        SheetError::new(ScanError::Host(err)),
                    ));
                }
            }
        }

        tracing::debug!(
            target = "keynote.batch",
            sheets = requests.len(),
            documents = groups.len(),
            "batch grouped by source document"
        );

        let mut cancelled = false;
        for (key, indices) in &groups {
            if token.is_cancelled() {
                tracing::debug!(
                    target = "keynote.batch",
                    remaining = indices.len(),
                    "batch cancelled between sheet-groups"
                );
                cancelled = true;
                break;
            }
            self.process_group(requests, key, indices, &outcomes);
        }

        let processed: Vec<SheetOutcome> = outcomes
            .into_inner()
            .into_iter()
            .flatten()
            .collect();

        let failed = processed.iter().filter(|o| o.is_failed()).count();
        if !cancelled && !processed.is_empty() && failed == processed.len() {
            return Err(BatchError::AllSheetsFailed { failed });
        }

        Ok(BatchReport {
            outcomes: processed,
            cancelled,
        })
    }

    /// Resolves one document, obtains its marker list (cached or fresh) and
    /// runs the containment filter for every sheet in the group.
    fn process_group(
        &self,
        requests: &[SheetRequest],
        key: &DocumentKey,
        indices: &[usize],
        outcomes: &Mutex<Vec<Option<SheetOutcome>>>,
    ) {
        let path = &requests[indices[0]].source;

        let markers: Result<Arc<Vec<Marker>>, ScanError> = self
            .orchestrator
            .with_document(path, |doc| {
                let fingerprint = Fingerprint::from_stamp(&doc.stamp);
                self.markers.get_or_scan(&doc.key, &fingerprint, || {
                    scan_markers(doc.access(), &self.filter)
                })
            })
            .map_err(ScanError::Host)
            .and_then(|inner| inner);

        let markers = match markers {
            Ok(markers) => markers,
            Err(err) => {
                tracing::warn!(
                    target = "keynote.batch",
                    document = %key.path().display(),
                    error = %err,
                    "document scan failed; its sheets yield no notes"
                );
                let shared = Arc::new(err);
                let mut outcomes = outcomes.lock();
                for &index in indices {
                    outcomes[index] = Some(SheetOutcome::failed(
                        requests[index].sheet.clone(),
                        SheetError::shared(&shared),
                    ));
                }
                return;
            }
        };

        self.pool.run_each(indices.len(), |slot| {
            let index = indices[slot];
            let request = &requests[index];

            let polygons: Vec<_> = request
                .viewports
                .iter()
                .filter_map(|spec| self.viewports.get_or_resolve(&request.layout, spec))
                .collect();
            let notes = notes_for_sheet(&markers, &polygons, &self.filter);

            tracing::debug!(
                target = "keynote.batch",
                sheet = %request.sheet,
                viewports = polygons.len(),
                notes = notes.len(),
                "sheet processed"
            );
            outcomes.lock()[index] = Some(SheetOutcome::ok(request.sheet.clone(), notes));
        });
    }
}
