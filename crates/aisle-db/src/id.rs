//! Numeric id allocation.
//!
//! Each table has one row in the `counter` table; ids are allocated by
//! incrementing it. SurrealDB executes each statement atomically, so
//! concurrent allocations never observe the same value.

use surrealdb::{Connection, Surreal};

use crate::error::DbError;

/// Allocate the next id for `table`.
pub async fn next_id<C: Connection>(db: &Surreal<C>, table: &str) -> Result<i64, DbError> {
    let mut result = db
        .query("UPSERT type::record('counter', $table) SET value += 1 RETURN VALUE value")
        .bind(("table", table.to_string()))
        .await?;

    let values: Vec<i64> = result.take(0)?;
    values
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Query(format!("counter for '{table}' returned no value")))
}
