//! Guest bulk import pipeline.
//!
//! Four stages: format check, column check, per-row validation,
//! sequential commit. The first two abort the whole import with a
//! row-0 error; row validation partitions, and the commit loop is
//! best-effort — one failing insert never rolls back the rest.

use serde_json::Value;
use tracing::{info, warn};

use aisle_core::error::{PanelError, PanelResult};
use aisle_core::models::guest::{Attendance, CreateGuest};
use aisle_core::models::import::{ImportReport, ImportRow, RowError};
use aisle_core::repository::GuestRepository;
use aisle_core::security::SecurityContext;
use aisle_secure::guests::{
    MAX_MESSAGE_LEN, MAX_NAME_LEN, MAX_RELATIONSHIP_LEN, SecureGuestRepository,
};

use crate::codec::{self, FileFormat, RowSet};

/// Upload size cap.
pub const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

const REQUIRED_COLUMNS: [&str; 3] = ["name", "relationship", "attendance"];

/// Column positions resolved from the header row. Matching is
/// case-insensitive on trimmed header names; extra columns are
/// ignored.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    name: usize,
    relationship: usize,
    attendance: usize,
    message: Option<usize>,
}

fn file_error(message: impl Into<String>) -> RowError {
    RowError {
        row: 0,
        errors: vec![message.into()],
    }
}

fn aborted(error: RowError) -> ImportReport {
    ImportReport {
        imported: 0,
        failed: 0,
        commit_errors: 0,
        errors: vec![error],
    }
}

/// Stage 1: filename extension and size.
fn validate_file(filename: &str, len: usize) -> Result<FileFormat, RowError> {
    let format = FileFormat::detect(filename).ok_or_else(|| {
        file_error("Unsupported file type. Please upload a CSV, XLSX or XLS file.")
    })?;
    if len > MAX_IMPORT_BYTES {
        return Err(file_error(format!(
            "File is too large ({len} bytes). The limit is {MAX_IMPORT_BYTES} bytes."
        )));
    }
    Ok(format)
}

/// Stage 2: required columns, matched case-insensitively on trimmed
/// header names.
fn resolve_columns(headers: &[String]) -> Result<ColumnMap, RowError> {
    let find = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    };

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| find(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(file_error(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    Ok(ColumnMap {
        name: find("name").unwrap_or(0),
        relationship: find("relationship").unwrap_or(0),
        attendance: find("attendance").unwrap_or(0),
        message: find("message"),
    })
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Stage 3: per-row validation. Every problem on a row is collected
/// before moving on, so one upload surfaces all of its errors at once.
fn validate_row(source_row: usize, row: &[String], columns: &ColumnMap) -> Result<ImportRow, RowError> {
    let mut errors = Vec::new();

    let name = cell(row, columns.name).trim();
    if name.is_empty() {
        errors.push("name is required".to_string());
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(format!("name must be at most {MAX_NAME_LEN} characters"));
    }

    let relationship = cell(row, columns.relationship).trim();
    if relationship.is_empty() {
        errors.push("relationship is required".to_string());
    } else if relationship.chars().count() > MAX_RELATIONSHIP_LEN {
        errors.push(format!(
            "relationship must be at most {MAX_RELATIONSHIP_LEN} characters"
        ));
    }

    let attendance = match Attendance::parse(cell(row, columns.attendance)) {
        Ok(a) => Some(a),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    };

    let message = columns
        .message
        .map(|i| cell(row, i).trim())
        .filter(|m| !m.is_empty());
    if let Some(m) = message {
        if m.chars().count() > MAX_MESSAGE_LEN {
            errors.push(format!(
                "message must be at most {MAX_MESSAGE_LEN} characters"
            ));
        }
    }

    if !errors.is_empty() {
        return Err(RowError {
            row: source_row,
            errors,
        });
    }
    Ok(ImportRow {
        row: source_row,
        name: name.to_string(),
        relationship: relationship.to_string(),
        // errors is empty, so attendance parsed
        attendance: attendance.unwrap_or(Attendance::Maybe),
        message: message.map(str::to_string),
    })
}

fn partition_rows(rowset: &RowSet, columns: &ColumnMap) -> (Vec<ImportRow>, Vec<RowError>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for (index, row) in rowset.rows.iter().enumerate() {
        // Trailing blank spreadsheet rows are noise, not failures.
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        // Header is row 1, so the first data row is row 2.
        match validate_row(index + 2, row, columns) {
            Ok(parsed) => valid.push(parsed),
            Err(e) => invalid.push(e),
        }
    }
    (valid, invalid)
}

/// Run the full import pipeline for one tenant.
///
/// Valid rows are committed sequentially through the secure repository;
/// a storage failure on one row is logged, counted in `commit_errors`,
/// and does not stop the remaining rows.
pub async fn import_guests<G: GuestRepository>(
    guests: &SecureGuestRepository<G>,
    ctx: &SecurityContext,
    tenant_id: i64,
    filename: &str,
    bytes: &[u8],
) -> PanelResult<ImportReport> {
    let format = match validate_file(filename, bytes.len()) {
        Ok(f) => f,
        Err(e) => return Ok(aborted(e)),
    };

    let rowset = match codec::parse_rows(format, bytes) {
        Ok(r) => r,
        Err(PanelError::Validation { message }) => return Ok(aborted(file_error(message))),
        Err(e) => return Err(e),
    };

    let columns = match resolve_columns(&rowset.headers) {
        Ok(c) => c,
        Err(e) => return Ok(aborted(e)),
    };

    let (valid, invalid) = partition_rows(&rowset, &columns);

    let mut report = ImportReport {
        imported: 0,
        failed: invalid.len(),
        commit_errors: 0,
        errors: invalid,
    };

    for row in valid {
        let input = CreateGuest {
            tenant_id,
            name: row.name,
            relationship: row.relationship,
            attendance: row.attendance,
            message: row.message,
        };
        match guests.create(ctx, input).await {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!(tenant_id, row = row.row, error = %e, "guest import row failed to commit");
                report.commit_errors += 1;
            }
        }
    }

    info!(
        tenant_id,
        imported = report.imported,
        failed = report.failed,
        commit_errors = report.commit_errors,
        "guest import finished"
    );
    Ok(report)
}

/// Report rendered for the HTTP layer, with the counts the panel UI
/// shows.
pub fn report_to_json(report: &ImportReport) -> Value {
    serde_json::json!({
        "imported": report.imported,
        "failed": report.failed,
        "commitErrors": report.commit_errors,
        "errors": report.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn rejects_unsupported_extension() {
        let err = validate_file("guests.pdf", 10).unwrap_err();
        assert_eq!(err.row, 0);
        assert!(err.errors[0].contains("Unsupported file type"));
    }

    #[test]
    fn rejects_oversized_file() {
        let err = validate_file("guests.csv", MAX_IMPORT_BYTES + 1).unwrap_err();
        assert_eq!(err.row, 0);
        assert!(err.errors[0].contains("too large"));
    }

    #[test]
    fn column_match_is_case_insensitive() {
        let map = resolve_columns(&headers(&[" Name ", "RELATIONSHIP", "Attendance", "Message"]))
            .unwrap();
        assert_eq!(map.name, 0);
        assert_eq!(map.relationship, 1);
        assert_eq!(map.attendance, 2);
        assert_eq!(map.message, Some(3));
    }

    #[test]
    fn missing_columns_are_listed() {
        let err = resolve_columns(&headers(&["name", "message"])).unwrap_err();
        assert_eq!(err.row, 0);
        assert_eq!(
            err.errors[0],
            "Missing required columns: relationship, attendance"
        );
    }

    #[test]
    fn extra_columns_are_ignored() {
        let map =
            resolve_columns(&headers(&["plus_one", "name", "relationship", "attendance"])).unwrap();
        assert_eq!(map.name, 1);
        assert_eq!(map.message, None);
    }

    #[test]
    fn row_collects_all_errors() {
        let map = resolve_columns(&headers(&["name", "relationship", "attendance"])).unwrap();
        let row = vec!["".to_string(), "".to_string(), "perhaps".to_string()];
        let err = validate_row(2, &row, &map).unwrap_err();
        assert_eq!(err.row, 2);
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn valid_row_parses() {
        let map =
            resolve_columns(&headers(&["name", "relationship", "attendance", "message"])).unwrap();
        let row = vec![
            "Ada".to_string(),
            "Friend".to_string(),
            "YES".to_string(),
            "".to_string(),
        ];
        let parsed = validate_row(2, &row, &map).unwrap();
        assert_eq!(parsed.name, "Ada");
        assert_eq!(parsed.attendance, Attendance::Yes);
        assert_eq!(parsed.message, None);
    }

    #[test]
    fn blank_rows_are_skipped_and_numbering_is_stable() {
        let rowset = RowSet {
            headers: headers(&["name", "relationship", "attendance"]),
            rows: vec![
                vec!["Ada".into(), "Friend".into(), "yes".into()],
                vec!["".into(), "".into(), "".into()],
                vec!["Bob".into(), "Cousin".into(), "nope".into()],
            ],
        };
        let map = resolve_columns(&rowset.headers).unwrap();
        let (valid, invalid) = partition_rows(&rowset, &map);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].row, 2);
        assert_eq!(invalid.len(), 1);
        // The blank row keeps its slot in the numbering.
        assert_eq!(invalid[0].row, 4);
    }
}
