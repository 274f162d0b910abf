//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Guest and media operations
//! require a `tenant_id` parameter to enforce data isolation; the
//! storage implementations additionally constrain single-record guest
//! operations to tenants that are still active.

use crate::error::PanelResult;
use crate::models::{
    file::{CreateMediaFile, MediaFile, MediaKind},
    guest::{Attendance, CreateGuest, Guest, GuestFilters, GuestStats, GuestWithWedding},
    tenant::{CreateTenant, Tenant, TenantFilters},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait TenantRepository: Send + Sync {
    /// Insert a new tenant with a server-generated slug. A unique-index
    /// violation on the slug surfaces as `DuplicateSlug`.
    fn create(
        &self,
        input: CreateTenant,
        slug: String,
    ) -> impl Future<Output = PanelResult<Tenant>> + Send;
    /// Load by id regardless of active state.
    fn get_by_id(&self, id: i64) -> impl Future<Output = PanelResult<Tenant>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = PanelResult<Tenant>> + Send;
    /// Full-row rewrite of all mutable fields; bumps `updated_at`.
    fn replace(&self, tenant: Tenant) -> impl Future<Output = PanelResult<Tenant>> + Send;
    /// Flip the soft-delete flag. `active = false` hides the tenant
    /// from default listings and blocks new guest writes.
    fn set_active(&self, id: i64, active: bool) -> impl Future<Output = PanelResult<()>> + Send;
    fn list(
        &self,
        filters: TenantFilters,
        pagination: Pagination,
    ) -> impl Future<Output = PanelResult<PaginatedResult<Tenant>>> + Send;
}

pub trait GuestRepository: Send + Sync {
    /// Insert a guest. Fails with a validation error when the owning
    /// tenant is missing or deactivated.
    fn create(&self, input: CreateGuest) -> impl Future<Output = PanelResult<Guest>> + Send;
    /// Load by `(tenant_id, id)`. Guests of deactivated tenants are
    /// not found.
    fn get_by_id(
        &self,
        tenant_id: i64,
        id: i64,
    ) -> impl Future<Output = PanelResult<Guest>> + Send;
    /// Full rewrite of all mutable fields, keyed by `(id, tenant_id)`.
    fn replace(&self, guest: Guest) -> impl Future<Output = PanelResult<Guest>> + Send;
    /// Hard delete scoped to `(id, tenant_id)`.
    fn delete(&self, tenant_id: i64, id: i64) -> impl Future<Output = PanelResult<()>> + Send;
    fn list(
        &self,
        filters: GuestFilters,
        pagination: Pagination,
    ) -> impl Future<Output = PanelResult<PaginatedResult<Guest>>> + Send;
    /// Aggregate RSVP counts for one tenant.
    fn stats(&self, tenant_id: i64) -> impl Future<Output = PanelResult<GuestStats>> + Send;
    /// Free-text search by name or relationship. `tenant_id = None`
    /// searches across all weddings (assistant path).
    fn search(
        &self,
        term: &str,
        tenant_id: Option<i64>,
        limit: u64,
    ) -> impl Future<Output = PanelResult<Vec<GuestWithWedding>>> + Send;
    /// Attendance-status shortcut. When `tenant_id` is supplied it is
    /// part of the update predicate; zero matched rows is a not-found
    /// error, never a silent no-op.
    fn set_attendance(
        &self,
        guest_id: i64,
        tenant_id: Option<i64>,
        attendance: Attendance,
    ) -> impl Future<Output = PanelResult<Guest>> + Send;
}

pub trait MediaFileRepository: Send + Sync {
    fn create(&self, input: CreateMediaFile)
    -> impl Future<Output = PanelResult<MediaFile>> + Send;
    /// List a tenant's files, optionally restricted to one kind,
    /// ordered by `display_order` then creation time.
    fn list(
        &self,
        tenant_id: i64,
        kind: Option<MediaKind>,
    ) -> impl Future<Output = PanelResult<Vec<MediaFile>>> + Send;
    fn set_display_order(
        &self,
        tenant_id: i64,
        id: i64,
        display_order: i64,
    ) -> impl Future<Output = PanelResult<MediaFile>> + Send;
    fn delete(&self, tenant_id: i64, id: i64) -> impl Future<Output = PanelResult<()>> + Send;
}
