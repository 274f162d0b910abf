//! Aisle Transfer — guest list import and export.
//!
//! Bulk CSV/Excel guest import with per-row validation and partial
//! commit, and the matching two-sheet workbook export.

pub mod codec;
pub mod export;
pub mod import;

pub use codec::{FileFormat, RowSet};
pub use export::{ExportFile, export_guests};
pub use import::{MAX_IMPORT_BYTES, import_guests};
