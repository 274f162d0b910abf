//! Transient types for the guest bulk import pipeline.

use serde::{Deserialize, Serialize};

use super::guest::Attendance;

/// One validated data row from an uploaded spreadsheet, not persisted
/// until individually committed as a guest.
#[derive(Debug, Clone)]
pub struct ImportRow {
    /// 1-based source row number. The header occupies row 1, so the
    /// first data row is row 2.
    pub row: usize,
    pub name: String,
    pub relationship: String,
    pub attendance: Attendance,
    pub message: Option<String>,
}

/// Validation failures for one source row. `row = 0` marks a
/// file-level failure (bad format or missing columns).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub errors: Vec<String>,
}

/// Final import report.
///
/// `failed` counts validation-stage rejections only; storage failures
/// during the commit loop are tracked separately in `commit_errors` so
/// that `imported + failed + commit_errors` always accounts for every
/// data row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub commit_errors: usize,
    pub errors: Vec<RowError>,
}
