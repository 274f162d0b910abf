//! End-to-end import and export tests over in-memory SurrealDB.

use std::sync::Arc;

use aisle_core::models::guest::{Attendance, CreateGuest};
use aisle_core::models::tenant::CreateTenant;
use aisle_core::security::SecurityContext;
use aisle_db::repository::{SurrealGuestRepository, SurrealTenantRepository};
use aisle_secure::{NoopLimiter, SecureConfig, SecureGuestRepository, SecureTenantRepository};
use aisle_transfer::{export_guests, import_guests};
use chrono::{TimeZone, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

type LocalDb = surrealdb::engine::local::Db;
type Tenants = SecureTenantRepository<SurrealTenantRepository<LocalDb>>;
type Guests = SecureGuestRepository<SurrealGuestRepository<LocalDb>>;

async fn setup() -> (Tenants, Guests, i64) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    aisle_db::run_migrations(&db).await.unwrap();

    let limiter = Arc::new(NoopLimiter);
    let tenants = SecureTenantRepository::new(
        SurrealTenantRepository::new(db.clone()),
        limiter.clone(),
    );
    let guests = SecureGuestRepository::new(
        SurrealGuestRepository::new(db),
        limiter,
        SecureConfig::default(),
    );

    let tenant = tenants
        .create(
            &admin(),
            CreateTenant {
                bride_name: "Amy".into(),
                groom_name: "Ben".into(),
                wedding_date: Utc.with_ymd_and_hms(2026, 10, 10, 0, 0, 0).unwrap(),
                venue_name: "Rose Hall".into(),
                venue_address: "1 Garden Way".into(),
                venue_map_link: None,
                primary_color: "#d4a373".into(),
                secondary_color: "#fefae0".into(),
                email: None,
                phone: None,
            },
        )
        .await
        .unwrap();

    (tenants, guests, tenant.id)
}

fn admin() -> SecurityContext {
    SecurityContext::admin("tester")
}

#[tokio::test]
async fn csv_import_commits_valid_rows_and_reports_the_rest() {
    let (_, guests, tenant_id) = setup().await;
    let ctx = admin();

    // Five valid rows, two with a missing name.
    let csv = "\
name,relationship,attendance,message
Ada,Friend,yes,See you there!
Bob,Cousin,no,
Cleo,Aunt,maybe,
,Friend,yes,
Dan,Colleague,YES,
,Uncle,no,
Eve,Friend,Maybe,Bringing cake
";

    let report = import_guests(&guests, &ctx, tenant_id, "guests.csv", csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.imported, 5);
    assert_eq!(report.failed, 2);
    assert_eq!(report.commit_errors, 0);

    // Errors carry 1-based source row numbers (header is row 1).
    let rows: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![5, 7]);
    assert!(report.errors[0].errors[0].contains("name is required"));

    let page = guests
        .find_many(
            &ctx,
            &[("tenant_id".to_string(), serde_json::json!(tenant_id))]
                .into_iter()
                .collect(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn missing_attendance_column_aborts_before_any_row() {
    let (_, guests, tenant_id) = setup().await;
    let ctx = admin();

    let csv = "name,relationship\nAda,Friend\nBob,Cousin\n";
    let report = import_guests(&guests, &ctx, tenant_id, "guests.csv", csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 0);
    assert_eq!(
        report.errors[0].errors[0],
        "Missing required columns: attendance"
    );

    let page = guests
        .find_many(
            &ctx,
            &[("tenant_id".to_string(), serde_json::json!(tenant_id))]
                .into_iter()
                .collect(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn unsupported_extension_is_a_file_level_error() {
    let (_, guests, tenant_id) = setup().await;
    let ctx = admin();

    let report = import_guests(&guests, &ctx, tenant_id, "guests.pdf", b"whatever")
        .await
        .unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 0);
}

#[tokio::test]
async fn commit_failures_are_counted_not_swallowed() {
    let (tenants, guests, tenant_id) = setup().await;
    let ctx = admin();

    // Deactivating the wedding makes every insert fail at commit time
    // while the rows themselves validate fine.
    tenants.delete(&ctx, tenant_id).await.unwrap();

    let csv = "name,relationship,attendance\nAda,Friend,yes\nBob,Cousin,no\n";
    let report = import_guests(&guests, &ctx, tenant_id, "guests.csv", csv.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.commit_errors, 2);
}

#[tokio::test]
async fn export_then_import_round_trips_guest_fields() {
    let (tenants, guests, tenant_id) = setup().await;
    let ctx = admin();

    for (name, attendance, message) in [
        ("Ada", Attendance::Yes, Some("See you there!")),
        ("Bob", Attendance::No, None),
        ("Cleo", Attendance::Maybe, Some("Plus one?")),
    ] {
        guests
            .create(
                &ctx,
                CreateGuest {
                    tenant_id,
                    name: name.into(),
                    relationship: "Friend".into(),
                    attendance,
                    message: message.map(str::to_string),
                },
            )
            .await
            .unwrap();
    }

    let file = export_guests(&tenants, &guests, &ctx, tenant_id).await.unwrap();
    assert!(file.filename.starts_with("amy-ben-guests-"));
    assert!(file.filename.ends_with(".xlsx"));

    // Import the workbook into a second wedding.
    let other = tenants
        .create(
            &ctx,
            CreateTenant {
                bride_name: "Cleo".into(),
                groom_name: "Dan".into(),
                wedding_date: Utc.with_ymd_and_hms(2027, 5, 5, 0, 0, 0).unwrap(),
                venue_name: "Lake House".into(),
                venue_address: "9 Shore Rd".into(),
                venue_map_link: None,
                primary_color: "#333333".into(),
                secondary_color: "#eeeeee".into(),
                email: None,
                phone: None,
            },
        )
        .await
        .unwrap();

    let report = import_guests(&guests, &ctx, other.id, &file.filename, &file.bytes)
        .await
        .unwrap();
    assert_eq!(report.imported, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.commit_errors, 0);

    let imported = guests.list_for_export(&ctx, other.id).await.unwrap();
    let ada = imported.iter().find(|g| g.name == "Ada").unwrap();
    assert_eq!(ada.relationship, "Friend");
    assert_eq!(ada.attendance, Attendance::Yes);
    assert_eq!(ada.message.as_deref(), Some("See you there!"));

    let bob = imported.iter().find(|g| g.name == "Bob").unwrap();
    assert_eq!(bob.attendance, Attendance::No);
    assert_eq!(bob.message, None);
}
