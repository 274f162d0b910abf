//! Guest list export: a two-sheet Excel workbook per wedding.
//!
//! Sheet order matters to the importer: the "Guests" data sheet is
//! located by name, so the "Wedding Info" cover sheet can come first.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use aisle_core::error::{PanelError, PanelResult};
use aisle_core::models::guest::Guest;
use aisle_core::models::tenant::Tenant;
use aisle_core::repository::{GuestRepository, TenantRepository};
use aisle_core::security::SecurityContext;
use aisle_secure::guests::SecureGuestRepository;
use aisle_secure::tenants::SecureTenantRepository;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A finished export: suggested download filename plus the workbook
/// bytes.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

fn workbook_error(e: XlsxError) -> PanelError {
    PanelError::Database(format!("workbook serialization failed: {e}"))
}

/// Download filename: hyphenated couple names plus the export date,
/// e.g. `amy-ben-guests-2026-08-29.xlsx`.
pub fn export_filename(tenant: &Tenant, exported_at: DateTime<Utc>) -> String {
    let join = |name: &str| {
        name.trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    };
    format!(
        "{}-{}-guests-{}.xlsx",
        join(&tenant.bride_name),
        join(&tenant.groom_name),
        exported_at.format("%Y-%m-%d")
    )
}

/// Render the two-sheet workbook into memory.
pub fn build_workbook(
    tenant: &Tenant,
    guests: &[Guest],
    exported_at: DateTime<Utc>,
) -> PanelResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let info = workbook.add_worksheet();
    info.set_name("Wedding Info").map_err(workbook_error)?;
    let facts: [(&str, String); 5] = [
        ("Bride", tenant.bride_name.clone()),
        ("Groom", tenant.groom_name.clone()),
        (
            "Wedding Date",
            tenant.wedding_date.format("%Y-%m-%d").to_string(),
        ),
        (
            "Exported At",
            exported_at.format(TIMESTAMP_FORMAT).to_string(),
        ),
        ("Guest Count", guests.len().to_string()),
    ];
    for (row, (label, value)) in facts.iter().enumerate() {
        let row = row as u32;
        info.write_string_with_format(row, 0, *label, &bold)
            .map_err(workbook_error)?;
        info.write_string(row, 1, value).map_err(workbook_error)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Guests").map_err(workbook_error)?;
    let headers = [
        "Name",
        "Relationship",
        "Attendance",
        "Message",
        "Created At",
        "Updated At",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(workbook_error)?;
    }
    for (index, guest) in guests.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, &guest.name).map_err(workbook_error)?;
        sheet
            .write_string(row, 1, &guest.relationship)
            .map_err(workbook_error)?;
        sheet
            .write_string(row, 2, guest.attendance.title_case())
            .map_err(workbook_error)?;
        sheet
            .write_string(row, 3, guest.message.as_deref().unwrap_or(""))
            .map_err(workbook_error)?;
        sheet
            .write_string(row, 4, guest.created_at.format(TIMESTAMP_FORMAT).to_string())
            .map_err(workbook_error)?;
        sheet
            .write_string(row, 5, guest.updated_at.format(TIMESTAMP_FORMAT).to_string())
            .map_err(workbook_error)?;
    }

    workbook.save_to_buffer().map_err(workbook_error)
}

/// Load one tenant's full guest list through the secure layer and
/// render it as a downloadable workbook.
pub async fn export_guests<T, G>(
    tenants: &SecureTenantRepository<T>,
    guests: &SecureGuestRepository<G>,
    ctx: &SecurityContext,
    tenant_id: i64,
) -> PanelResult<ExportFile>
where
    T: TenantRepository,
    G: GuestRepository,
{
    let tenant = tenants.find_by_id(ctx, tenant_id).await?;
    let rows = guests.list_for_export(ctx, tenant_id).await?;

    let exported_at = Utc::now();
    let bytes = build_workbook(&tenant, &rows, exported_at)?;
    let filename = export_filename(&tenant, exported_at);

    info!(tenant_id, guests = rows.len(), %filename, "guest export rendered");
    Ok(ExportFile { filename, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_core::models::guest::Attendance;
    use chrono::TimeZone;

    use crate::codec::{self, FileFormat};

    fn sample_tenant() -> Tenant {
        Tenant {
            id: 1,
            slug: "amy-ben-x1y2z".into(),
            bride_name: "Amy Rose".into(),
            groom_name: "Ben".into(),
            wedding_date: Utc.with_ymd_and_hms(2026, 10, 10, 0, 0, 0).unwrap(),
            venue_name: "Rose Hall".into(),
            venue_address: "1 Garden Way".into(),
            venue_map_link: None,
            primary_color: "#d4a373".into(),
            secondary_color: "#fefae0".into(),
            email: None,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_guest(name: &str, attendance: Attendance) -> Guest {
        Guest {
            id: 1,
            tenant_id: 1,
            name: name.into(),
            relationship: "Friend".into(),
            attendance,
            message: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn filename_hyphenates_names_and_dates() {
        let at = Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).unwrap();
        assert_eq!(
            export_filename(&sample_tenant(), at),
            "amy-rose-ben-guests-2026-08-29.xlsx"
        );
    }

    #[test]
    fn workbook_data_sheet_round_trips_through_the_importer_codec() {
        let guests = vec![
            sample_guest("Ada", Attendance::Yes),
            sample_guest("Bob", Attendance::Maybe),
        ];
        let bytes = build_workbook(&sample_tenant(), &guests, Utc::now()).unwrap();

        let rowset = codec::parse_rows(FileFormat::Excel, &bytes).unwrap();
        assert_eq!(rowset.headers[0], "Name");
        assert_eq!(rowset.headers[2], "Attendance");
        assert_eq!(rowset.rows.len(), 2);
        assert_eq!(rowset.rows[0][0], "Ada");
        assert_eq!(rowset.rows[0][2], "Yes");
        assert_eq!(rowset.rows[1][2], "Maybe");
    }

    #[test]
    fn workbook_renders_with_no_guests() {
        let bytes = build_workbook(&sample_tenant(), &[], Utc::now()).unwrap();
        assert!(!bytes.is_empty());
    }
}
