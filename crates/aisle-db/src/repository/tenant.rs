//! SurrealDB implementation of [`TenantRepository`].

use aisle_core::error::PanelResult;
use aisle_core::models::tenant::{CreateTenant, Tenant, TenantFilters};
use aisle_core::repository::{PaginatedResult, Pagination, TenantRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::id::next_id;

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    slug: String,
    bride_name: String,
    groom_name: String,
    wedding_date: DateTime<Utc>,
    venue_name: String,
    venue_address: String,
    venue_map_link: Option<String>,
    primary_color: String,
    secondary_color: String,
    email: Option<String>,
    phone: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: i64) -> Tenant {
        Tenant {
            id,
            slug: self.slug,
            bride_name: self.bride_name,
            groom_name: self.groom_name,
            wedding_date: self.wedding_date,
            venue_name: self.venue_name,
            venue_address: self.venue_address,
            venue_map_link: self.venue_map_link,
            primary_color: self.primary_color,
            secondary_color: self.secondary_color,
            email: self.email,
            phone: self.phone,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: i64,
    slug: String,
    bride_name: String,
    groom_name: String,
    wedding_date: DateTime<Utc>,
    venue_name: String,
    venue_address: String,
    venue_map_link: Option<String>,
    primary_color: String,
    secondary_color: String,
    email: Option<String>,
    phone: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn into_tenant(self) -> Tenant {
        Tenant {
            id: self.record_id,
            slug: self.slug,
            bride_name: self.bride_name,
            groom_name: self.groom_name,
            wedding_date: self.wedding_date,
            venue_name: self.venue_name,
            venue_address: self.venue_address,
            venue_map_link: self.venue_map_link,
            primary_color: self.primary_color,
            secondary_color: self.secondary_color,
            email: self.email,
            phone: self.phone,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Map a unique-index violation on the slug to its own error kind so
/// the facade can surface `DUPLICATE_SLUG`.
fn slug_conflict(err: surrealdb::Error, slug: &str) -> DbError {
    if err.to_string().contains("idx_tenant_slug") {
        DbError::DuplicateSlug {
            slug: slug.to_string(),
        }
    } else {
        DbError::Surreal(err)
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant, slug: String) -> PanelResult<Tenant> {
        let id = next_id(&self.db, "tenant").await?;

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 slug = $slug, \
                 bride_name = $bride_name, groom_name = $groom_name, \
                 wedding_date = $wedding_date, \
                 venue_name = $venue_name, venue_address = $venue_address, \
                 venue_map_link = $venue_map_link, \
                 primary_color = $primary_color, \
                 secondary_color = $secondary_color, \
                 email = $email, phone = $phone, \
                 is_active = true",
            )
            .bind(("id", id))
            .bind(("slug", slug.clone()))
            .bind(("bride_name", input.bride_name))
            .bind(("groom_name", input.groom_name))
            .bind(("wedding_date", input.wedding_date))
            .bind(("venue_name", input.venue_name))
            .bind(("venue_address", input.venue_address))
            .bind(("venue_map_link", input.venue_map_link))
            .bind(("primary_color", input.primary_color))
            .bind(("secondary_color", input.secondary_color))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .await
            .map_err(|e| slug_conflict(e, &slug))?;

        let mut result = result.check().map_err(|e| slug_conflict(e, &slug))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_tenant(id))
    }

    async fn get_by_id(&self, id: i64) -> PanelResult<Tenant> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_tenant(id))
    }

    async fn get_by_slug(&self, slug: &str) -> PanelResult<Tenant> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM tenant \
                 WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.into_tenant())
    }

    async fn replace(&self, tenant: Tenant) -> PanelResult<Tenant> {
        let id = tenant.id;

        let result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 slug = $slug, \
                 bride_name = $bride_name, groom_name = $groom_name, \
                 wedding_date = $wedding_date, \
                 venue_name = $venue_name, venue_address = $venue_address, \
                 venue_map_link = $venue_map_link, \
                 primary_color = $primary_color, \
                 secondary_color = $secondary_color, \
                 email = $email, phone = $phone, \
                 is_active = $is_active, \
                 updated_at = time::now()",
            )
            .bind(("id", id))
            .bind(("slug", tenant.slug))
            .bind(("bride_name", tenant.bride_name))
            .bind(("groom_name", tenant.groom_name))
            .bind(("wedding_date", tenant.wedding_date))
            .bind(("venue_name", tenant.venue_name))
            .bind(("venue_address", tenant.venue_address))
            .bind(("venue_map_link", tenant.venue_map_link))
            .bind(("primary_color", tenant.primary_color))
            .bind(("secondary_color", tenant.secondary_color))
            .bind(("email", tenant.email))
            .bind(("phone", tenant.phone))
            .bind(("is_active", tenant.is_active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_tenant(id))
    }

    async fn set_active(&self, id: i64, active: bool) -> PanelResult<()> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 is_active = $active, updated_at = time::now()",
            )
            .bind(("id", id))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "tenant".into(),
                id: id.to_string(),
            }
            .into());
        }

        Ok(())
    }

    async fn list(
        &self,
        filters: TenantFilters,
        pagination: Pagination,
    ) -> PanelResult<PaginatedResult<Tenant>> {
        // Default predicate restricts to active tenants unless the
        // caller filtered on is_active explicitly.
        let is_active = filters.is_active.unwrap_or(true);
        let mut conditions = vec!["is_active = $is_active"];

        if filters.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(bride_name), $search) \
                 OR string::contains(string::lowercase(groom_name), $search) \
                 OR string::contains(string::lowercase(slug), $search))",
            );
        }
        if filters.wedding_date_from.is_some() {
            conditions.push("wedding_date >= $wedding_date_from");
        }
        if filters.wedding_date_to.is_some() {
            conditions.push("wedding_date <= $wedding_date_to");
        }

        let predicate = conditions.join(" AND ");
        let search = filters.search.map(|s| s.to_lowercase());

        let count_query = format!("SELECT count() AS total FROM tenant WHERE {predicate} GROUP ALL");
        let mut builder = self.db.query(&count_query).bind(("is_active", is_active));
        if let Some(ref s) = search {
            builder = builder.bind(("search", s.clone()));
        }
        if let Some(from) = filters.wedding_date_from {
            builder = builder.bind(("wedding_date_from", from));
        }
        if let Some(to) = filters.wedding_date_to {
            builder = builder.bind(("wedding_date_to", to));
        }
        let mut count_result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let data_query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM tenant \
             WHERE {predicate} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&data_query)
            .bind(("is_active", is_active))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(s) = search {
            builder = builder.bind(("search", s));
        }
        if let Some(from) = filters.wedding_date_from {
            builder = builder.bind(("wedding_date_from", from));
        }
        if let Some(to) = filters.wedding_date_to {
            builder = builder.bind(("wedding_date_to", to));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows.into_iter().map(TenantRowWithId::into_tenant).collect();

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
