//! Core domain types for mapslink enrichment runs.

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{MapsLinkError, Result};

/// Cell text written for rows whose lookup returned zero candidates.
pub const NOT_FOUND_SENTINEL: &str = "Not Found";

/// Cell text written for rows whose lookup failed (network, bad response, provider error).
pub const LOOKUP_FAILED_SENTINEL: &str = "Lookup Failed";

// ---------------------------------------------------------------------------
// CellValue
// ---------------------------------------------------------------------------

/// A single cell of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    /// Integer cell, kept exact beyond the f64 mantissa.
    Int(i64),
    Bool(bool),
    /// Calendar date-time, already resolved from the workbook's date system.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Coerce the cell to text, the form used as a lookup query.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Int(i) => i.to_string(),
            Self::Bool(true) => "TRUE".into(),
            Self::Bool(false) => "FALSE".into(),
            Self::DateTime(dt) => format_datetime(dt),
        }
    }

    /// Whether the cell holds nothing usable as text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// An ordered table of named columns and rows.
///
/// Every row has exactly `columns().len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset, padding short rows with [`CellValue::Empty`].
    ///
    /// Rows wider than the header are rejected.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let width = columns.len();
        let mut padded = Vec::with_capacity(rows.len());
        for (idx, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(MapsLinkError::validation(format!(
                    "row {} has {} cells but the header has {width} columns",
                    idx + 1,
                    row.len()
                )));
            }
            row.resize(width, CellValue::Empty);
            padded.push(row);
        }
        Ok(Self {
            columns,
            rows: padded,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of `name` in the header, if present (exact match).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Dataset::column_index`] but fails with [`MapsLinkError::InvalidColumn`].
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| MapsLinkError::InvalidColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Text coercion of every cell in column `idx`, in row order.
    pub fn column_texts(&self, idx: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map(CellValue::to_text).unwrap_or_default())
            .collect()
    }

    /// Pick a header name based on `base` that does not collide with an
    /// existing column: `base`, then `base (2)`, `base (3)`, ...
    pub fn unique_column_name(&self, base: &str) -> String {
        if self.column_index(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} ({n})"))
            .find(|candidate| self.column_index(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Append a column. `values` must have one entry per row.
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(MapsLinkError::validation(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        if self.column_index(&name).is_some() {
            return Err(MapsLinkError::validation(format!(
                "column '{name}' already exists"
            )));
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lookup types
// ---------------------------------------------------------------------------

/// Free-text query built from one row's location cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery(String);

impl LookupQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a successful lookup call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The provider's top-ranked candidate.
    Found { place_id: String },
    /// The provider returned zero candidates. Not an error.
    NotFound,
}

/// Value written into the output column for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapLink {
    Url(String),
    NotFound,
    LookupFailed { reason: String },
}

impl MapLink {
    /// Text written into the output cell.
    pub fn cell_text(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::NotFound => NOT_FOUND_SENTINEL,
            Self::LookupFailed { .. } => LOOKUP_FAILED_SENTINEL,
        }
    }
}

impl fmt::Display for MapLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cell_text())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API key for one enrichment run. Never shown by `Debug` or `Display`.
pub struct Credentials(SecretString);

impl Credentials {
    /// Wrap an API key. Blank keys fail with [`MapsLinkError::MissingCredentials`].
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(MapsLinkError::missing_credentials("API key is empty"));
        }
        Ok(Self(SecretString::from(trimmed.to_string())))
    }

    /// The raw key, for placing on an outbound request only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[test]
    fn number_text_drops_integral_fraction() {
        assert_eq!(CellValue::Number(42.0).to_text(), "42");
        assert_eq!(CellValue::Number(-3.0).to_text(), "-3");
        assert_eq!(CellValue::Number(2.5).to_text(), "2.5");
    }

    #[test]
    fn int_text_keeps_every_digit() {
        assert_eq!(CellValue::Int(7).to_text(), "7");
        assert_eq!(
            CellValue::Int(9_007_199_254_740_993).to_text(),
            "9007199254740993"
        );
    }

    #[test]
    fn datetime_text_is_iso() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            CellValue::from(day.and_hms_opt(0, 0, 0).unwrap()).to_text(),
            "2024-01-01"
        );
        assert_eq!(
            CellValue::from(day.and_hms_opt(12, 0, 0).unwrap()).to_text(),
            "2024-01-01 12:00:00"
        );
    }

    #[test]
    fn blank_cells() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::from("Paris").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn dataset_pads_short_rows() {
        let ds = Dataset::new(
            vec!["Name".into(), "Country".into()],
            vec![text_row(&["Louvre"])],
        )
        .unwrap();
        assert_eq!(ds.rows()[0], vec![CellValue::from("Louvre"), CellValue::Empty]);
    }

    #[test]
    fn dataset_rejects_wide_rows() {
        let err = Dataset::new(vec!["Name".into()], vec![text_row(&["a", "b"])]).unwrap_err();
        assert!(err.to_string().contains("row 1 has 2 cells"));
    }

    #[test]
    fn require_column_reports_invalid_column() {
        let ds = Dataset::new(vec!["Name".into()], vec![]).unwrap();
        assert_eq!(ds.require_column("Name").unwrap(), 0);
        match ds.require_column("name") {
            Err(MapsLinkError::InvalidColumn { column, available }) => {
                assert_eq!(column, "name");
                assert_eq!(available, vec!["Name".to_string()]);
            }
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
    }

    #[test]
    fn append_column_checks_length_and_name() {
        let mut ds = Dataset::new(
            vec!["Name".into()],
            vec![text_row(&["a"]), text_row(&["b"])],
        )
        .unwrap();

        assert!(ds.append_column("Link", vec![CellValue::Empty]).is_err());
        assert!(
            ds.append_column("Name", vec![CellValue::Empty, CellValue::Empty])
                .is_err()
        );

        ds.append_column("Link", vec![CellValue::from("x"), CellValue::from("y")])
            .unwrap();
        assert_eq!(ds.columns(), ["Name", "Link"]);
        assert_eq!(ds.column_texts(1), vec!["x", "y"]);
    }

    #[test]
    fn unique_column_name_adds_suffix() {
        let ds = Dataset::new(
            vec!["Google Maps URL".into(), "Google Maps URL (2)".into()],
            vec![],
        )
        .unwrap();
        assert_eq!(ds.unique_column_name("Link"), "Link");
        assert_eq!(ds.unique_column_name("Google Maps URL"), "Google Maps URL (3)");
    }

    #[test]
    fn map_link_cell_text() {
        assert_eq!(MapLink::NotFound.cell_text(), "Not Found");
        assert_eq!(
            MapLink::LookupFailed {
                reason: "timeout".into()
            }
            .cell_text(),
            "Lookup Failed"
        );
        assert_eq!(MapLink::Url("https://x".into()).to_string(), "https://x");
    }

    #[test]
    fn credentials_reject_blank_and_redact() {
        assert!(matches!(
            Credentials::new("  "),
            Err(MapsLinkError::MissingCredentials { .. })
        ));
        let creds = Credentials::new(" secret-key ").unwrap();
        assert_eq!(creds.expose(), "secret-key");
        assert!(!format!("{creds:?}").contains("secret-key"));
    }
}
