//! End-to-end `enrich` pipeline: workbook file → dataset → lookups → workbook file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use mapslink_lookup::PlaceLookup;
use mapslink_sheet::ReadOptions;
use mapslink_shared::{Credentials, MapLink, MapsLinkError, Result};

use crate::enricher::{self, EnrichOptions, EnrichStats};

/// Configuration for the [`enrich_file`] pipeline.
#[derive(Debug, Clone)]
pub struct EnrichFileConfig {
    /// Workbook to read.
    pub input: PathBuf,
    /// Where to write the enriched workbook.
    pub output: PathBuf,
    /// Worksheet to read (first sheet when `None`).
    pub sheet: Option<String>,
    /// Column holding location names.
    pub location_column: String,
    /// Header for the appended link column.
    pub output_column: String,
    /// Maximum lookups in flight.
    pub concurrency: usize,
}

/// Result of the [`enrich_file`] pipeline.
#[derive(Debug)]
pub struct EnrichFileResult {
    /// Path the enriched workbook was written to.
    pub output_path: PathBuf,
    /// Content type of the written workbook.
    pub content_type: &'static str,
    /// Header actually used for the link column.
    pub output_column: String,
    /// Lookup counters.
    pub stats: EnrichStats,
    /// Degraded rows as (zero-based row index, reason).
    pub failures: Vec<(usize, String)>,
    /// Total elapsed time, including file I/O.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the row count is known, before the first lookup.
    fn rows_started(&self, total: usize);
    /// Called for each row, in row order, once its link is known.
    fn row_resolved(&self, index: usize, total: usize, link: &MapLink);
    /// Called when the pipeline completes.
    fn done(&self, result: &EnrichFileResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn rows_started(&self, _total: usize) {}
    fn row_resolved(&self, _index: usize, _total: usize, _link: &MapLink) {}
    fn done(&self, _result: &EnrichFileResult) {}
}

/// Run the full `enrich` pipeline.
///
/// 1. Read the workbook
/// 2. Validate the location column (before any network call)
/// 3. Resolve every row
/// 4. Write the enriched workbook
#[instrument(skip_all, fields(input = %config.input.display(), column = %config.location_column))]
pub async fn enrich_file(
    config: &EnrichFileConfig,
    lookup: Arc<dyn PlaceLookup>,
    credentials: Arc<Credentials>,
    progress: &dyn ProgressReporter,
) -> Result<EnrichFileResult> {
    let start = Instant::now();

    // --- Phase 1: Read ---
    progress.phase("Reading workbook");
    let read_opts = ReadOptions {
        sheet: config.sheet.clone(),
    };
    let dataset = mapslink_sheet::read_path(&config.input, &read_opts)?;
    dataset.require_column(&config.location_column)?;

    info!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "workbook loaded"
    );

    // --- Phase 2: Resolve ---
    progress.phase("Resolving locations");
    progress.rows_started(dataset.row_count());
    let opts = EnrichOptions {
        location_column: config.location_column.clone(),
        output_column: config.output_column.clone(),
        concurrency: config.concurrency,
    };
    let outcome = enricher::enrich(dataset, &opts, lookup, credentials, progress).await?;

    // --- Phase 3: Write ---
    progress.phase("Writing workbook");
    let download = mapslink_sheet::encode_download(&outcome.dataset)?;

    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MapsLinkError::io(parent, e))?;
    }
    std::fs::write(&config.output, &download.bytes)
        .map_err(|e| MapsLinkError::io(&config.output, e))?;

    let result = EnrichFileResult {
        output_path: config.output.clone(),
        content_type: download.content_type,
        output_column: outcome.output_column,
        stats: outcome.stats,
        failures: outcome.failures,
        elapsed: start.elapsed(),
    };

    info!(
        output = %result.output_path.display(),
        bytes = download.bytes.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "enriched workbook written"
    );

    progress.done(&result);
    Ok(result)
}
