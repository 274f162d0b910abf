//! Integration tests for the MediaFile repository using in-memory SurrealDB.

use aisle_core::models::file::{CreateMediaFile, MediaKind};
use aisle_core::models::tenant::CreateTenant;
use aisle_core::repository::{MediaFileRepository, TenantRepository};
use aisle_db::repository::{SurrealMediaFileRepository, SurrealTenantRepository};
use chrono::{TimeZone, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn setup() -> (Surreal<surrealdb::engine::local::Db>, i64) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    aisle_db::run_migrations(&db).await.unwrap();

    let tenants = SurrealTenantRepository::new(db.clone());
    let tenant = tenants
        .create(
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
            "amy-ben-x1y2z".into(),
        )
        .await
        .unwrap();

    (db, tenant.id)
}

fn file_input(tenant_id: i64, kind: MediaKind, url: &str, order: i64) -> CreateMediaFile {
    CreateMediaFile {
        tenant_id,
        kind,
        url: url.into(),
        display_name: None,
        display_order: order,
    }
}

#[tokio::test]
async fn create_and_list_ordered() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealMediaFileRepository::new(db);

    repo.create(file_input(tenant_id, MediaKind::Image, "https://cdn/img2.jpg", 2))
        .await
        .unwrap();
    repo.create(file_input(tenant_id, MediaKind::Image, "https://cdn/img1.jpg", 1))
        .await
        .unwrap();
    repo.create(file_input(tenant_id, MediaKind::Music, "https://cdn/song.mp3", 0))
        .await
        .unwrap();

    // All kinds, ascending display order.
    let files = repo.list(tenant_id, None).await.unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0].url, "https://cdn/song.mp3");
    assert_eq!(files[1].url, "https://cdn/img1.jpg");

    // Kind filter.
    let images = repo.list(tenant_id, Some(MediaKind::Image)).await.unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|f| f.kind == MediaKind::Image));
}

#[tokio::test]
async fn list_is_tenant_scoped() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealMediaFileRepository::new(db);

    repo.create(file_input(tenant_id, MediaKind::Image, "https://cdn/img.jpg", 0))
        .await
        .unwrap();

    let files = repo.list(999, None).await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn reorder_and_delete() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealMediaFileRepository::new(db);

    let file = repo
        .create(file_input(tenant_id, MediaKind::Image, "https://cdn/img.jpg", 5))
        .await
        .unwrap();

    let moved = repo.set_display_order(tenant_id, file.id, 1).await.unwrap();
    assert_eq!(moved.display_order, 1);

    // Wrong tenant cannot reorder or delete.
    let err = repo.set_display_order(999, file.id, 0).await.unwrap_err();
    assert_eq!(err.http_status(), 404);

    repo.delete(tenant_id, file.id).await.unwrap();
    let files = repo.list(tenant_id, None).await.unwrap();
    assert!(files.is_empty());
}
