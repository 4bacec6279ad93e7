//! Workbook decoding via `calamine` (xlsx, xls, ods).

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::{debug, instrument};

use mapslink_shared::{CellValue, Dataset, MapsLinkError, Result};

/// Options for decoding a workbook.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Worksheet to read. `None` reads the first one.
    pub sheet: Option<String>,
}

/// Read a workbook file from disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_path(path: &Path, opts: &ReadOptions) -> Result<Dataset> {
    let bytes = std::fs::read(path).map_err(|e| MapsLinkError::io(path, e))?;
    read_bytes(bytes, opts)
}

/// Decode workbook bytes. The first row of the sheet is the header.
pub fn read_bytes(bytes: Vec<u8>, opts: &ReadOptions) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MapsLinkError::Sheet(format!("failed to open workbook: {e}")))?;

    let names = workbook.sheet_names();
    let sheet = match &opts.sheet {
        Some(name) if names.contains(name) => name.clone(),
        Some(name) => {
            return Err(MapsLinkError::validation(format!(
                "sheet '{name}' not found (available: {})",
                names.join(", ")
            )));
        }
        None => names
            .first()
            .cloned()
            .ok_or_else(|| MapsLinkError::validation("workbook has no worksheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| MapsLinkError::Sheet(format!("failed to read sheet '{sheet}': {e}")))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| MapsLinkError::validation(format!("sheet '{sheet}' is empty")))?;
    let columns = header_names(header);
    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    debug!(sheet = %sheet, columns = columns.len(), rows = body.len(), "sheet decoded");
    Dataset::new(columns, body)
}

/// List worksheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| MapsLinkError::io(path, e))?;
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| MapsLinkError::Sheet(format!("failed to open workbook: {e}")))?;
    Ok(workbook.sheet_names())
}

/// Turn a header row into unique column names.
///
/// Blank headers become `Unnamed: {index}`; repeats get `.1`, `.2`, ... suffixes.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let value = cell_value(cell);
            let base = if value.is_blank() {
                format!("Unnamed: {idx}")
            } else {
                value.to_text()
            };

            let mut name = base.clone();
            let mut n = 1;
            while seen.contains(&name) {
                name = format!("{base}.{n}");
                n += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        // as_datetime applies the workbook's 1900/1904 date system.
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map_or(CellValue::Number(dt.as_f64()), CellValue::DateTime),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;

    use crate::writer::encode;

    fn text(s: &str) -> Data {
        Data::String(s.into())
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let header = vec![
            text("Name"),
            Data::Empty,
            text("Name"),
            text("Name"),
            Data::Float(2024.0),
        ];
        assert_eq!(
            header_names(&header),
            vec!["Name", "Unnamed: 1", "Name.1", "Name.2", "2024"]
        );
    }

    #[test]
    fn cell_values_map_to_dataset_cells() {
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Int(7));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(cell_value(&text("Louvre")), CellValue::Text("Louvre".into()));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }

    fn excel_date(serial: f64, is_1904: bool) -> Data {
        Data::DateTime(ExcelDateTime::new(
            serial,
            ExcelDateTimeType::DateTime,
            is_1904,
        ))
    }

    fn ymd(y: i32, m: u32, d: u32) -> CellValue {
        let day = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        CellValue::DateTime(day.and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn date_cells_follow_the_workbook_date_system() {
        // Same calendar day, stored under each system.
        assert_eq!(cell_value(&excel_date(45292.0, false)), ymd(2024, 1, 1));
        assert_eq!(cell_value(&excel_date(43830.0, true)), ymd(2024, 1, 1));
    }

    #[test]
    fn early_1900_serials_skip_the_phantom_leap_day() {
        assert_eq!(cell_value(&excel_date(1.0, false)), ymd(1900, 1, 1));
        assert_eq!(cell_value(&excel_date(61.0, false)), ymd(1900, 3, 1));
    }

    #[test]
    fn durations_stay_numeric() {
        let cell = Data::DateTime(ExcelDateTime::new(
            1.5,
            ExcelDateTimeType::TimeDelta,
            false,
        ));
        assert_eq!(cell_value(&cell), CellValue::Number(1.5));
    }

    #[test]
    fn dates_from_1904_workbooks_survive_write_back() {
        let opened = cell_value(&excel_date(43830.0, true));
        let dataset = Dataset::new(
            vec!["Name".into(), "Opened".into()],
            vec![vec!["Louvre".into(), opened]],
        )
        .unwrap();
        assert_eq!(dataset.column_texts(1), vec!["2024-01-01"]);

        let decoded = read_bytes(encode(&dataset, "Places").unwrap(), &ReadOptions::default())
            .unwrap();
        assert_eq!(decoded.rows()[0][1], ymd(2024, 1, 1));
        assert_eq!(decoded.column_texts(1), vec!["2024-01-01"]);
    }

    #[test]
    fn roundtrip_through_xlsx_bytes() {
        let dataset = Dataset::new(
            vec!["Name".into(), "Visitors".into(), "Open".into()],
            vec![
                vec!["Eiffel Tower".into(), CellValue::Number(7_000_000.0), CellValue::Bool(true)],
                vec!["Louvre".into(), CellValue::Number(8.5), CellValue::Empty],
            ],
        )
        .unwrap();

        let bytes = encode(&dataset, "Places").unwrap();
        let decoded = read_bytes(bytes, &ReadOptions::default()).unwrap();

        assert_eq!(decoded.columns(), dataset.columns());
        assert_eq!(decoded.row_count(), 2);
        assert_eq!(decoded.column_texts(0), vec!["Eiffel Tower", "Louvre"]);
        assert_eq!(decoded.column_texts(1), vec!["7000000", "8.5"]);
        assert_eq!(decoded.rows()[0][2], CellValue::Bool(true));
        assert_eq!(decoded.rows()[1][2], CellValue::Empty);
    }

    #[test]
    fn named_sheet_must_exist() {
        let dataset = Dataset::new(vec!["Name".into()], vec![vec!["Louvre".into()]]).unwrap();
        let bytes = encode(&dataset, "Places").unwrap();

        let opts = ReadOptions {
            sheet: Some("Missing".into()),
        };
        let err = read_bytes(bytes.clone(), &opts).unwrap_err();
        assert!(err.to_string().contains("sheet 'Missing' not found"));
        assert!(err.to_string().contains("Places"));

        let opts = ReadOptions {
            sheet: Some("Places".into()),
        };
        assert_eq!(read_bytes(bytes, &opts).unwrap().row_count(), 1);
    }

    #[test]
    fn empty_sheet_is_rejected() {
        let dataset = Dataset::new(vec![], vec![]).unwrap();
        let bytes = encode(&dataset, "Empty").unwrap();
        let err = read_bytes(bytes, &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn garbage_bytes_are_a_sheet_error() {
        let err = read_bytes(b"definitely not a workbook".to_vec(), &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, MapsLinkError::Sheet(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_path(Path::new("/nonexistent/places.xlsx"), &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, MapsLinkError::Io { .. }));
    }
}
