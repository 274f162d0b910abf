//! Uniform tabular decoding for uploaded files.
//!
//! CSV and Excel uploads both decode to a [`RowSet`]: one header row
//! plus string cells. Cell typing is deliberately flattened — the
//! import validator treats everything as text.

use std::io::Cursor;

use aisle_core::error::{PanelError, PanelResult};
use calamine::{Data, Reader};

/// Decoded tabular file: the header row plus data rows, all as
/// strings.
#[derive(Debug, Clone)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// File format, detected from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Detect from the extension; anything outside {csv, xlsx, xls}
    /// is unsupported.
    pub fn detect(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" | "xls" => Some(FileFormat::Excel),
            _ => None,
        }
    }
}

/// Decode an uploaded file into a [`RowSet`].
pub fn parse_rows(format: FileFormat, bytes: &[u8]) -> PanelResult<RowSet> {
    match format {
        FileFormat::Csv => parse_csv(bytes),
        FileFormat::Excel => parse_excel(bytes),
    }
}

fn parse_csv(bytes: &[u8]) -> PanelResult<RowSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| PanelError::validation(format!("malformed CSV: {e}")))?;
        records.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    rowset_from_records(records)
}

fn parse_excel(bytes: &[u8]) -> PanelResult<RowSet> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| PanelError::validation(format!("unreadable workbook: {e}")))?;

    // Exported workbooks carry an info sheet alongside the data sheet;
    // prefer a sheet named "Guests" so export output re-imports as-is.
    let sheet_name = workbook
        .sheet_names()
        .iter()
        .find(|name| name.eq_ignore_ascii_case("guests"))
        .cloned()
        .or_else(|| workbook.sheet_names().first().cloned())
        .ok_or_else(|| PanelError::validation("workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PanelError::validation(format!("unreadable sheet: {e}")))?;

    let records = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
        .collect();

    rowset_from_records(records)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn rowset_from_records(mut records: Vec<Vec<String>>) -> PanelResult<RowSet> {
    if records.is_empty() {
        return Err(PanelError::validation("file contains no rows"));
    }
    let headers = records.remove(0);
    Ok(RowSet {
        headers,
        rows: records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_extensions() {
        assert_eq!(FileFormat::detect("guests.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::detect("Guests.XLSX"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::detect("old.xls"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::detect("guests.pdf"), None);
        assert_eq!(FileFormat::detect("noextension"), None);
    }

    #[test]
    fn csv_decodes_headers_and_rows() {
        let bytes = b"name,relationship,attendance\nAda,Friend,yes\nBob,Cousin,maybe\n";
        let rowset = parse_rows(FileFormat::Csv, bytes).unwrap();
        assert_eq!(rowset.headers, vec!["name", "relationship", "attendance"]);
        assert_eq!(rowset.rows.len(), 2);
        assert_eq!(rowset.rows[0], vec!["Ada", "Friend", "yes"]);
    }

    #[test]
    fn csv_cells_are_trimmed() {
        let bytes = b"name, relationship \n  Ada , Friend \n";
        let rowset = parse_rows(FileFormat::Csv, bytes).unwrap();
        assert_eq!(rowset.headers[1], "relationship");
        assert_eq!(rowset.rows[0], vec!["Ada", "Friend"]);
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = parse_rows(FileFormat::Csv, b"").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
