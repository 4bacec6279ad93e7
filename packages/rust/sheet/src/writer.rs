//! Workbook encoding via `rust_xlsxwriter`.

use chrono::{NaiveDateTime, NaiveTime};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::debug;

use mapslink_shared::{CellValue, Dataset, MapsLinkError, Result};

use crate::{OUTPUT_SHEET_NAME, XLSX_CONTENT_TYPE};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Largest integer an `.xlsx` number cell holds exactly (2^53).
const MAX_EXACT_INT: i64 = 1 << 53;

/// An encoded workbook ready to be saved or served.
#[derive(Debug, Clone)]
pub struct EncodedWorkbook {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode `dataset` as the output workbook.
pub fn encode_download(dataset: &Dataset) -> Result<EncodedWorkbook> {
    let bytes = encode(dataset, OUTPUT_SHEET_NAME)?;
    debug!(bytes = bytes.len(), "workbook encoded");
    Ok(EncodedWorkbook {
        content_type: XLSX_CONTENT_TYPE,
        bytes,
    })
}

/// Encode `dataset` as a single-sheet `.xlsx` with a bold header row.
pub fn encode(dataset: &Dataset, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(sheet_error)?;

    for (col, name) in dataset.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_num(col)?, name, &header_format)
            .map_err(sheet_error)?;
    }

    for (idx, row) in dataset.rows().iter().enumerate() {
        let sheet_row = row_num(idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            let col = col_num(col)?;
            let written = match cell {
                CellValue::Empty => continue,
                CellValue::Text(s) => worksheet.write_string(sheet_row, col, s),
                CellValue::Number(n) => worksheet.write_number(sheet_row, col, *n),
                CellValue::Int(i) if (-MAX_EXACT_INT..=MAX_EXACT_INT).contains(i) => {
                    worksheet.write_number(sheet_row, col, *i as f64)
                }
                CellValue::Int(i) => worksheet.write_string(sheet_row, col, i.to_string()),
                CellValue::Bool(b) => worksheet.write_boolean(sheet_row, col, *b),
                CellValue::DateTime(dt) => {
                    let format = if date_num_format(dt) == DATE_FORMAT {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_datetime_with_format(sheet_row, col, dt, format)
                }
            };
            written.map_err(sheet_error)?;
        }
    }

    worksheet.autofit();

    workbook.save_to_buffer().map_err(sheet_error)
}

/// Date-only values (midnight) drop the time part from their display.
fn date_num_format(dt: &NaiveDateTime) -> &'static str {
    if dt.time() == NaiveTime::MIN {
        DATE_FORMAT
    } else {
        DATETIME_FORMAT
    }
}

fn row_num(idx: usize) -> Result<u32> {
    u32::try_from(idx)
        .map_err(|_| MapsLinkError::validation(format!("row {idx} exceeds the sheet row limit")))
}

fn col_num(idx: usize) -> Result<u16> {
    u16::try_from(idx).map_err(|_| {
        MapsLinkError::validation(format!("column {idx} exceeds the sheet column limit"))
    })
}

fn sheet_error(err: XlsxError) -> MapsLinkError {
    MapsLinkError::Sheet(err.to_string())
}
