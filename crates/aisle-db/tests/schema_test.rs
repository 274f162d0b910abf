//! Migration runner tests using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn migrations_run_and_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    aisle_db::run_migrations(&db).await.unwrap();
    // Re-running applies nothing and must not fail.
    aisle_db::run_migrations(&db).await.unwrap();

    // The tracking table records exactly one applied version.
    let mut result = db
        .query("SELECT VALUE version FROM _migration")
        .await
        .unwrap();
    let versions: Vec<u32> = result.take(0).unwrap();
    assert_eq!(versions, vec![1]);
}

#[tokio::test]
async fn schema_enforces_attendance_values() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    aisle_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE guest:1 SET tenant_id = 1, name = 'Ada', \
             relationship = 'Friend', attendance = 'perhaps'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}
