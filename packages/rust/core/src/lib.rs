//! Core enrichment pipeline for mapslink.
//!
//! This crate ties the lookup client and the spreadsheet codec into the
//! end-to-end workflow: compose links ([`link`]), resolve rows with failure
//! isolation ([`resolver`]), enrich whole datasets ([`enricher`]), and run
//! file-to-file jobs ([`pipeline`]).

pub mod enricher;
pub mod link;
pub mod pipeline;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use enricher::{EnrichOptions, EnrichOutcome, EnrichStats, enrich};
pub use link::{MAPS_PLACE_URL, compose};
pub use pipeline::{
    EnrichFileConfig, EnrichFileResult, ProgressReporter, SilentProgress, enrich_file,
};
pub use resolver::resolve_row;
