//! Spreadsheet codec: workbook bytes to [`Dataset`](mapslink_shared::Dataset) and back.
//!
//! This crate provides:
//! - [`read_path`] / [`read_bytes`]: decode the first (or a named) worksheet,
//!   first row as header
//! - [`encode`] / [`encode_download`]: write a dataset as a single-sheet `.xlsx`

mod reader;
mod writer;

pub use reader::{ReadOptions, read_bytes, read_path, sheet_names};
pub use writer::{EncodedWorkbook, encode, encode_download};

/// Content type of the produced workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Worksheet name used for output workbooks.
pub const OUTPUT_SHEET_NAME: &str = "Sheet1";
