//! SurrealDB implementation of [`GuestRepository`].
//!
//! Single-record operations are constrained by `(id, tenant_id)` and
//! additionally require the owning tenant to be active, so guests of a
//! deactivated wedding stay invisible even though their rows persist.

use aisle_core::error::{PanelError, PanelResult};
use aisle_core::models::guest::{
    Attendance, CreateGuest, Guest, GuestFilters, GuestStats, GuestWithWedding,
};
use aisle_core::repository::{GuestRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::id::next_id;

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct GuestRow {
    tenant_id: i64,
    name: String,
    relationship: String,
    attendance: String,
    message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GuestRow {
    fn into_guest(self, id: i64) -> Result<Guest, DbError> {
        Ok(Guest {
            id,
            tenant_id: self.tenant_id,
            name: self.name,
            relationship: self.relationship,
            attendance: parse_attendance(&self.attendance)?,
            message: self.message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GuestRowWithId {
    record_id: i64,
    tenant_id: i64,
    name: String,
    relationship: String,
    attendance: String,
    message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GuestRowWithId {
    fn into_guest(self) -> Result<Guest, DbError> {
        Ok(Guest {
            id: self.record_id,
            tenant_id: self.tenant_id,
            name: self.name,
            relationship: self.relationship,
            attendance: parse_attendance(&self.attendance)?,
            message: self.message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_attendance(s: &str) -> Result<Attendance, DbError> {
    Attendance::parse(s).map_err(|_| DbError::Query(format!("unknown attendance value: {s}")))
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Row struct for the RSVP aggregate query.
#[derive(Debug, SurrealValue)]
struct StatsRow {
    total: u64,
    attending: u64,
    not_attending: u64,
    maybe: u64,
}

/// Tenant display fields for denormalized search results.
#[derive(Debug, SurrealValue)]
struct WeddingRow {
    record_id: i64,
    bride_name: String,
    groom_name: String,
    wedding_date: DateTime<Utc>,
}

/// SurrealDB implementation of the Guest repository.
#[derive(Clone)]
pub struct SurrealGuestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGuestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Whether the owning tenant exists and is active.
    async fn tenant_is_active(&self, tenant_id: i64) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT VALUE is_active FROM type::record('tenant', $tenant_id)")
            .bind(("tenant_id", tenant_id))
            .await?;
        let values: Vec<bool> = result.take(0)?;
        Ok(values.into_iter().next().unwrap_or(false))
    }

    /// Ids of all active tenants, used to keep cross-tenant operations
    /// from touching deactivated weddings.
    async fn active_tenant_ids(&self) -> Result<Vec<i64>, DbError> {
        let mut result = self
            .db
            .query("SELECT VALUE meta::id(id) FROM tenant WHERE is_active = true")
            .await?;
        let ids: Vec<i64> = result.take(0)?;
        Ok(ids)
    }

    fn guest_not_found(id: i64) -> DbError {
        DbError::NotFound {
            entity: "guest".into(),
            id: id.to_string(),
        }
    }
}

impl<C: Connection> GuestRepository for SurrealGuestRepository<C> {
    async fn create(&self, input: CreateGuest) -> PanelResult<Guest> {
        // A deactivated wedding blocks new guest writes.
        if !self.tenant_is_active(input.tenant_id).await? {
            return Err(PanelError::validation(format!(
                "tenant {} is missing or inactive",
                input.tenant_id
            )));
        }

        let id = next_id(&self.db, "guest").await?;

        let result = self
            .db
            .query(
                "CREATE type::record('guest', $id) SET \
                 tenant_id = $tenant_id, \
                 name = $name, relationship = $relationship, \
                 attendance = $attendance, message = $message",
            )
            .bind(("id", id))
            .bind(("tenant_id", input.tenant_id))
            .bind(("name", input.name))
            .bind(("relationship", input.relationship))
            .bind(("attendance", input.attendance.as_str().to_string()))
            .bind(("message", input.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GuestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Self::guest_not_found(id))?;

        Ok(row.into_guest(id)?)
    }

    async fn get_by_id(&self, tenant_id: i64, id: i64) -> PanelResult<Guest> {
        if !self.tenant_is_active(tenant_id).await? {
            return Err(Self::guest_not_found(id).into());
        }

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('guest', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GuestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Self::guest_not_found(id))?;

        Ok(row.into_guest(id)?)
    }

    async fn replace(&self, guest: Guest) -> PanelResult<Guest> {
        if !self.tenant_is_active(guest.tenant_id).await? {
            return Err(Self::guest_not_found(guest.id).into());
        }

        let id = guest.id;

        let result = self
            .db
            .query(
                "UPDATE type::record('guest', $id) SET \
                 name = $name, relationship = $relationship, \
                 attendance = $attendance, message = $message, \
                 updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id))
            .bind(("tenant_id", guest.tenant_id))
            .bind(("name", guest.name))
            .bind(("relationship", guest.relationship))
            .bind(("attendance", guest.attendance.as_str().to_string()))
            .bind(("message", guest.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GuestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Self::guest_not_found(id))?;

        Ok(row.into_guest(id)?)
    }

    async fn delete(&self, tenant_id: i64, id: i64) -> PanelResult<()> {
        if !self.tenant_is_active(tenant_id).await? {
            return Err(Self::guest_not_found(id).into());
        }

        self.db
            .query(
                "DELETE type::record('guest', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        filters: GuestFilters,
        pagination: Pagination,
    ) -> PanelResult<PaginatedResult<Guest>> {
        let mut conditions = vec!["tenant_id = $tenant_id"];
        if filters.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(name), $search) \
                 OR string::contains(string::lowercase(relationship), $search))",
            );
        }
        if filters.attendance.is_some() {
            conditions.push("attendance = $attendance");
        }
        let predicate = conditions.join(" AND ");
        let search = filters.search.map(|s| s.to_lowercase());

        let count_query = format!("SELECT count() AS total FROM guest WHERE {predicate} GROUP ALL");
        let mut builder = self
            .db
            .query(&count_query)
            .bind(("tenant_id", filters.tenant_id));
        if let Some(ref s) = search {
            builder = builder.bind(("search", s.clone()));
        }
        if let Some(a) = filters.attendance {
            builder = builder.bind(("attendance", a.as_str().to_string()));
        }
        let mut count_result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let data_query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM guest \
             WHERE {predicate} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&data_query)
            .bind(("tenant_id", filters.tenant_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(s) = search {
            builder = builder.bind(("search", s));
        }
        if let Some(a) = filters.attendance {
            builder = builder.bind(("attendance", a.as_str().to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<GuestRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(GuestRowWithId::into_guest)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn stats(&self, tenant_id: i64) -> PanelResult<GuestStats> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total, \
                 count(attendance = 'yes') AS attending, \
                 count(attendance = 'no') AS not_attending, \
                 count(attendance = 'maybe') AS maybe \
                 FROM guest WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StatsRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|r| GuestStats {
                total: r.total,
                attending: r.attending,
                not_attending: r.not_attending,
                maybe: r.maybe,
            })
            .unwrap_or_default())
    }

    async fn search(
        &self,
        term: &str,
        tenant_id: Option<i64>,
        limit: u64,
    ) -> PanelResult<Vec<GuestWithWedding>> {
        let active_ids = self.active_tenant_ids().await?;

        let mut conditions = vec![
            "tenant_id IN $active_ids",
            "(string::contains(string::lowercase(name), $search) \
             OR string::contains(string::lowercase(relationship), $search))",
        ];
        if tenant_id.is_some() {
            conditions.push("tenant_id = $tenant_id");
        }
        let predicate = conditions.join(" AND ");

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM guest \
             WHERE {predicate} \
             ORDER BY created_at DESC \
             LIMIT $limit"
        );
        let mut builder = self
            .db
            .query(&query)
            .bind(("active_ids", active_ids))
            .bind(("search", term.to_lowercase()))
            .bind(("limit", limit));
        if let Some(tid) = tenant_id {
            builder = builder.bind(("tenant_id", tid));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<GuestRowWithId> = result.take(0).map_err(DbError::from)?;
        let guests = rows
            .into_iter()
            .map(GuestRowWithId::into_guest)
            .collect::<Result<Vec<_>, DbError>>()?;

        // Denormalize with the owning tenants' display fields.
        let mut wanted: Vec<i64> = guests.iter().map(|g| g.tenant_id).collect();
        wanted.sort_unstable();
        wanted.dedup();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, bride_name, groom_name, \
                 wedding_date \
                 FROM tenant WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", wanted))
            .await
            .map_err(DbError::from)?;
        let weddings: Vec<WeddingRow> = result.take(0).map_err(DbError::from)?;

        let by_id: std::collections::HashMap<i64, WeddingRow> = weddings
            .into_iter()
            .map(|w| (w.record_id, w))
            .collect();

        let joined = guests
            .into_iter()
            .filter_map(|guest| {
                by_id.get(&guest.tenant_id).map(|w| GuestWithWedding {
                    bride_name: w.bride_name.clone(),
                    groom_name: w.groom_name.clone(),
                    wedding_date: w.wedding_date,
                    guest,
                })
            })
            .collect();

        Ok(joined)
    }

    async fn set_attendance(
        &self,
        guest_id: i64,
        tenant_id: Option<i64>,
        attendance: Attendance,
    ) -> PanelResult<Guest> {
        let active_ids = self.active_tenant_ids().await?;

        let mut conditions = vec!["tenant_id IN $active_ids"];
        if tenant_id.is_some() {
            // Defense in depth: the caller-asserted tenant id is part
            // of the update predicate itself.
            conditions.push("tenant_id = $tenant_id");
        }
        let predicate = conditions.join(" AND ");

        let query = format!(
            "UPDATE type::record('guest', $id) SET \
             attendance = $attendance, updated_at = time::now() \
             WHERE {predicate}"
        );
        let mut builder = self
            .db
            .query(&query)
            .bind(("id", guest_id))
            .bind(("attendance", attendance.as_str().to_string()))
            .bind(("active_ids", active_ids));
        if let Some(tid) = tenant_id {
            builder = builder.bind(("tenant_id", tid));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<GuestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Self::guest_not_found(guest_id))?;

        Ok(row.into_guest(guest_id)?)
    }
}
