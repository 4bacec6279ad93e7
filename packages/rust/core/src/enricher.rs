//! Batch enrichment: resolve every row of a dataset and append the link column.
//!
//! With `concurrency == 1` rows are resolved strictly one after another in
//! input order. Higher values run up to that many lookups at once behind a
//! semaphore. Either way results are assembled by row index, so output order
//! never depends on completion order, and a failed row only degrades its own
//! cell.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{Instrument, Span, info, instrument, warn};

use mapslink_lookup::PlaceLookup;
use mapslink_shared::{CellValue, Credentials, Dataset, MAX_CONCURRENCY, MapLink, Result};

use crate::pipeline::ProgressReporter;
use crate::resolver::resolve_row;

/// Options for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Column holding the location text.
    pub location_column: String,
    /// Header for the appended link column (suffixed if it already exists).
    pub output_column: String,
    /// Maximum lookups in flight, clamped to `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,
}

/// Per-run counters.
#[derive(Debug, Clone, Default)]
pub struct EnrichStats {
    pub rows: usize,
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Result of [`enrich`].
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    /// Input dataset plus the appended link column.
    pub dataset: Dataset,
    /// Header actually used for the link column.
    pub output_column: String,
    pub stats: EnrichStats,
    /// Degraded rows as (zero-based row index, reason).
    pub failures: Vec<(usize, String)>,
}

/// Resolve `location_column` for every row and append the link column.
///
/// Fails with `InvalidColumn` before any lookup if the column is missing.
/// Per-row lookup failures never fail the run.
#[instrument(skip_all, fields(column = %opts.location_column, rows = dataset.row_count()))]
pub async fn enrich(
    mut dataset: Dataset,
    opts: &EnrichOptions,
    lookup: Arc<dyn PlaceLookup>,
    credentials: Arc<Credentials>,
    progress: &dyn ProgressReporter,
) -> Result<EnrichOutcome> {
    let start = Instant::now();
    let column_idx = dataset.require_column(&opts.location_column)?;
    let concurrency = opts.concurrency.clamp(1, MAX_CONCURRENCY);
    let texts = dataset.column_texts(column_idx);

    info!(concurrency, "resolving locations");

    let links = if concurrency == 1 {
        resolve_sequential(texts, lookup.as_ref(), &credentials, progress).await
    } else {
        resolve_concurrent(texts, lookup, credentials, concurrency, progress).await
    };

    let mut stats = EnrichStats {
        rows: links.len(),
        ..EnrichStats::default()
    };
    let mut failures = Vec::new();
    for (idx, link) in links.iter().enumerate() {
        match link {
            MapLink::Url(_) => stats.found += 1,
            MapLink::NotFound => stats.not_found += 1,
            MapLink::LookupFailed { reason } => {
                stats.failed += 1;
                failures.push((idx, reason.clone()));
            }
        }
    }

    let output_column = dataset.unique_column_name(&opts.output_column);
    if output_column != opts.output_column {
        warn!(
            requested = %opts.output_column,
            used = %output_column,
            "output column already exists, using a suffixed name"
        );
    }
    let values = links
        .into_iter()
        .map(|link| CellValue::Text(link.cell_text().to_string()))
        .collect();
    dataset.append_column(output_column.clone(), values)?;

    stats.elapsed = start.elapsed();
    info!(
        found = stats.found,
        not_found = stats.not_found,
        failed = stats.failed,
        elapsed_ms = stats.elapsed.as_millis(),
        "enrichment completed"
    );

    Ok(EnrichOutcome {
        dataset,
        output_column,
        stats,
        failures,
    })
}

async fn resolve_sequential(
    texts: Vec<String>,
    lookup: &dyn PlaceLookup,
    credentials: &Credentials,
    progress: &dyn ProgressReporter,
) -> Vec<MapLink> {
    let total = texts.len();
    let mut links = Vec::with_capacity(total);
    for (idx, text) in texts.iter().enumerate() {
        let link = resolve_row(lookup, text, credentials).await;
        progress.row_resolved(idx, total, &link);
        links.push(link);
    }
    links
}

async fn resolve_concurrent(
    texts: Vec<String>,
    lookup: Arc<dyn PlaceLookup>,
    credentials: Arc<Credentials>,
    concurrency: usize,
    progress: &dyn ProgressReporter,
) -> Vec<MapLink> {
    let total = texts.len();
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let handles: Vec<_> = texts
        .into_iter()
        .map(|text| {
            let lookup = Arc::clone(&lookup);
            let credentials = Arc::clone(&credentials);
            let sem = Arc::clone(&semaphore);
            tokio::spawn(
                async move {
                    let Ok(_permit) = sem.acquire().await else {
                        return MapLink::LookupFailed {
                            reason: "lookup scheduler shut down".into(),
                        };
                    };
                    resolve_row(lookup.as_ref(), &text, &credentials).await
                }
                .instrument(Span::current()),
            )
        })
        .collect();

    // Awaiting in spawn order keeps row order regardless of completion order.
    let mut links = Vec::with_capacity(total);
    for (idx, handle) in handles.into_iter().enumerate() {
        let link = match handle.await {
            Ok(link) => link,
            Err(e) => {
                warn!(row = idx, error = %e, "lookup task aborted");
                MapLink::LookupFailed {
                    reason: format!("lookup task aborted: {e}"),
                }
            }
        };
        progress.row_resolved(idx, total, &link);
        links.push(link);
    }
    links
}
