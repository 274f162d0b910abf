//! Security-gated guest repository facade.
//!
//! Guest operations are the sharp edge of tenant isolation: every
//! single-record path validates the caller-asserted tenant id against
//! the stored one after loading, and `GuestFilters` makes the tenant
//! id structurally mandatory for listings.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use aisle_core::error::{PanelError, PanelResult};
use aisle_core::models::guest::{
    Attendance, CreateGuest, Guest, GuestFilters, GuestStats, GuestWithWedding, UpdateGuest,
};
use aisle_core::params;
use aisle_core::repository::{GuestRepository, PaginatedResult, Pagination};
use aisle_core::security::{Operation, SecurityContext, validate_access, validate_scope};

use crate::config::SecureConfig;
use crate::ratelimit::{RateDecision, RateLimiter};

/// Field length caps shared with the bulk import validator.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_RELATIONSHIP_LEN: usize = 50;
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Tenant scoping for the assistant-facing operations.
///
/// `AllTenants` is a deliberate, explicitly-opted-into widening used
/// by the AI assistant to work across weddings. Scope can never widen
/// by accident: absence of a tenant id is not expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestScope {
    Tenant(i64),
    AllTenants,
}

impl GuestScope {
    fn tenant_id(self) -> Option<i64> {
        match self {
            GuestScope::Tenant(id) => Some(id),
            GuestScope::AllTenants => None,
        }
    }

    fn validate(self) -> PanelResult<Self> {
        if let GuestScope::Tenant(id) = self {
            if id <= 0 {
                return Err(PanelError::validation(
                    "tenant_id must be a positive integer",
                ));
            }
        }
        Ok(self)
    }
}

/// Generic over the repository implementation so that the secure layer
/// has no dependency on the database crate.
pub struct SecureGuestRepository<G: GuestRepository> {
    inner: G,
    limiter: Arc<dyn RateLimiter>,
    config: SecureConfig,
}

impl<G: GuestRepository> SecureGuestRepository<G> {
    pub fn new(inner: G, limiter: Arc<dyn RateLimiter>, config: SecureConfig) -> Self {
        Self {
            inner,
            limiter,
            config,
        }
    }

    /// Rate limit + access validation, run at the top of every method.
    fn gate(&self, ctx: &SecurityContext, operation: Operation) -> PanelResult<()> {
        match self.limiter.check(ctx.limiter_key()) {
            RateDecision::Allowed => {}
            RateDecision::Limited => return Err(PanelError::RateLimited),
            RateDecision::Unavailable => {
                // Fail open: a broken limiter must not take the panel down.
                warn!(key = ctx.limiter_key(), "rate limiter unavailable, allowing request");
            }
        }
        validate_access(ctx, operation)
    }

    fn require_id(id: i64, name: &str) -> PanelResult<i64> {
        if id > 0 {
            Ok(id)
        } else {
            Err(PanelError::validation(format!("{name} must be a positive integer")))
        }
    }

    fn validate_fields(
        name: &str,
        relationship: &str,
        message: Option<&str>,
    ) -> PanelResult<()> {
        if name.trim().is_empty() {
            return Err(PanelError::validation("name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(PanelError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if relationship.trim().is_empty() {
            return Err(PanelError::validation("relationship is required"));
        }
        if relationship.chars().count() > MAX_RELATIONSHIP_LEN {
            return Err(PanelError::validation(format!(
                "relationship must be at most {MAX_RELATIONSHIP_LEN} characters"
            )));
        }
        if let Some(m) = message {
            if m.chars().count() > MAX_MESSAGE_LEN {
                return Err(PanelError::validation(format!(
                    "message must be at most {MAX_MESSAGE_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &SecurityContext, input: CreateGuest) -> PanelResult<Guest> {
        self.gate(ctx, Operation::Write)?;
        Self::require_id(input.tenant_id, "tenant_id")?;
        Self::validate_fields(&input.name, &input.relationship, input.message.as_deref())?;
        self.inner.create(input).await
    }

    pub async fn find_by_id(
        &self,
        ctx: &SecurityContext,
        tenant_id: i64,
        guest_id: i64,
    ) -> PanelResult<Guest> {
        self.gate(ctx, Operation::Read)?;
        let tenant_id = Self::require_id(tenant_id, "tenant_id")?;
        let guest_id = Self::require_id(guest_id, "id")?;
        self.inner.get_by_id(tenant_id, guest_id).await
    }

    /// Load, scope-check, merge, rewrite. The scope check after the
    /// load is the last line of defense against guest-id guessing
    /// across tenants.
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        tenant_id: i64,
        guest_id: i64,
        patch: UpdateGuest,
    ) -> PanelResult<Guest> {
        self.gate(ctx, Operation::Write)?;
        let tenant_id = Self::require_id(tenant_id, "tenant_id")?;
        let guest_id = Self::require_id(guest_id, "id")?;

        let current = self.inner.get_by_id(tenant_id, guest_id).await?;
        validate_scope(tenant_id, current.tenant_id)?;

        let merged = patch.apply_to(current);
        Self::validate_fields(&merged.name, &merged.relationship, merged.message.as_deref())?;
        self.inner.replace(merged).await
    }

    /// Hard delete, scoped to `(id, tenant_id)`.
    pub async fn delete(
        &self,
        ctx: &SecurityContext,
        tenant_id: i64,
        guest_id: i64,
    ) -> PanelResult<()> {
        self.gate(ctx, Operation::Delete)?;
        let tenant_id = Self::require_id(tenant_id, "tenant_id")?;
        let guest_id = Self::require_id(guest_id, "id")?;

        let current = self.inner.get_by_id(tenant_id, guest_id).await?;
        validate_scope(tenant_id, current.tenant_id)?;

        self.inner.delete(tenant_id, guest_id).await
    }

    /// List with untrusted filters. `tenant_id` is mandatory — there
    /// is no cross-tenant listing path here.
    pub async fn find_many(
        &self,
        ctx: &SecurityContext,
        raw_params: &Map<String, Value>,
    ) -> PanelResult<PaginatedResult<Guest>> {
        self.gate(ctx, Operation::Read)?;

        let clean = params::sanitize(raw_params);
        let tenant_id = params::get_id(&clean, "tenant_id")
            .ok_or_else(|| PanelError::validation("tenant_id is required"))?;

        let filters = GuestFilters {
            tenant_id,
            search: clean
                .get("search")
                .and_then(Value::as_str)
                .map(str::to_string),
            attendance: match clean.get("attendance").and_then(Value::as_str) {
                Some(s) => Some(Attendance::parse(s)?),
                None => None,
            },
        };
        let (offset, limit) = params::page_offset(&clean);

        self.inner.list(filters, Pagination { offset, limit }).await
    }

    /// Full filtered guest set for export; pagination is deliberately
    /// bypassed in favor of the configured export cap.
    pub async fn list_for_export(
        &self,
        ctx: &SecurityContext,
        tenant_id: i64,
    ) -> PanelResult<Vec<Guest>> {
        self.gate(ctx, Operation::Read)?;
        let tenant_id = Self::require_id(tenant_id, "tenant_id")?;

        let page = self
            .inner
            .list(
                GuestFilters::for_tenant(tenant_id),
                Pagination {
                    offset: 0,
                    limit: self.config.export_limit,
                },
            )
            .await?;
        Ok(page.items)
    }

    pub async fn guest_stats(
        &self,
        ctx: &SecurityContext,
        tenant_id: i64,
    ) -> PanelResult<GuestStats> {
        self.gate(ctx, Operation::Read)?;
        let tenant_id = Self::require_id(tenant_id, "tenant_id")?;
        self.inner.stats(tenant_id).await
    }

    /// Free-text search by name or relationship. With
    /// [`GuestScope::AllTenants`] this searches every active wedding,
    /// the assistant's cross-tenant path.
    pub async fn search_guests(
        &self,
        ctx: &SecurityContext,
        term: &str,
        scope: GuestScope,
    ) -> PanelResult<Vec<GuestWithWedding>> {
        self.gate(ctx, Operation::Read)?;
        let scope = scope.validate()?;

        let term: String = term.trim().chars().take(params::MAX_SEARCH_LEN).collect();
        if term.is_empty() {
            return Err(PanelError::validation("search term is required"));
        }

        self.inner
            .search(&term, scope.tenant_id(), self.config.search_limit)
            .await
    }

    /// Attendance-status shortcut. The status string is validated
    /// before any query runs; with [`GuestScope::Tenant`] the tenant
    /// id is part of the update predicate itself, so a wrong tenant
    /// yields not-found rather than a silent update.
    pub async fn update_guest_status(
        &self,
        ctx: &SecurityContext,
        guest_id: i64,
        status: &str,
        scope: GuestScope,
    ) -> PanelResult<Guest> {
        self.gate(ctx, Operation::Write)?;
        let guest_id = Self::require_id(guest_id, "guest_id")?;
        let scope = scope.validate()?;
        let attendance = Attendance::parse(status)?;

        self.inner
            .set_attendance(guest_id, scope.tenant_id(), attendance)
            .await
    }
}
