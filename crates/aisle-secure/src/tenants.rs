//! Security-gated tenant repository facade.
//!
//! Every method runs the same gauntlet before touching storage:
//! rate limit, access validation, parameter sanitization, and (for
//! mutations) a load-then-scope-check sequence.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::warn;

use aisle_core::error::{PanelError, PanelResult};
use aisle_core::models::tenant::{
    CreateTenant, Tenant, TenantContext, TenantFilters, UpdateTenant,
};
use aisle_core::params;
use aisle_core::repository::{PaginatedResult, Pagination, TenantRepository};
use aisle_core::security::{Operation, SecurityContext, validate_access, validate_scope};
use aisle_core::slug::generate_slug;

use crate::ratelimit::{RateDecision, RateLimiter};

/// Generic over the repository implementation so that the secure layer
/// has no dependency on the database crate.
pub struct SecureTenantRepository<R: TenantRepository> {
    inner: R,
    limiter: Arc<dyn RateLimiter>,
}

impl<R: TenantRepository> SecureTenantRepository<R> {
    pub fn new(inner: R, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { inner, limiter }
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

    pub async fn create(&self, ctx: &SecurityContext, input: CreateTenant) -> PanelResult<Tenant> {
        self.gate(ctx, Operation::Write)?;

        if input.bride_name.trim().is_empty() || input.groom_name.trim().is_empty() {
            return Err(PanelError::validation("bride and groom names are required"));
        }

        let slug = generate_slug(&input.bride_name, &input.groom_name);
        match self.inner.create(input.clone(), slug).await {
            // The random suffix makes collisions rare; retry once with
            // a fresh one before surfacing the conflict.
            Err(PanelError::DuplicateSlug { .. }) => {
                let retry = generate_slug(&input.bride_name, &input.groom_name);
                self.inner.create(input, retry).await
            }
            other => other,
        }
    }

    pub async fn find_by_id(&self, ctx: &SecurityContext, id: i64) -> PanelResult<Tenant> {
        self.gate(ctx, Operation::Read)?;
        let id = Self::require_id(id, "id")?;
        self.inner.get_by_id(id).await
    }

    pub async fn find_by_slug(&self, ctx: &SecurityContext, slug: &str) -> PanelResult<Tenant> {
        self.gate(ctx, Operation::Read)?;
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(PanelError::validation("slug is required"));
        }
        self.inner.get_by_slug(slug).await
    }

    /// Full-row-rewrite update: the sanitized patch is merged onto the
    /// loaded row and every field written back. Two concurrent updates
    /// race last-write-wins; there is no version column.
    pub async fn update(
        &self,
        ctx: &SecurityContext,
        id: i64,
        patch: UpdateTenant,
    ) -> PanelResult<Tenant> {
        self.gate(ctx, Operation::Write)?;
        let id = Self::require_id(id, "id")?;

        let current = self.inner.get_by_id(id).await?;
        validate_scope(id, current.id)?;

        let merged = patch.apply_to(current);
        self.inner.replace(merged).await
    }

    /// Soft delete: flips `is_active` off, never removes the row.
    pub async fn delete(&self, ctx: &SecurityContext, id: i64) -> PanelResult<()> {
        self.gate(ctx, Operation::Delete)?;
        let id = Self::require_id(id, "id")?;

        let current = self.inner.get_by_id(id).await?;
        validate_scope(id, current.id)?;

        self.inner.set_active(id, false).await
    }

    pub async fn update_status(
        &self,
        ctx: &SecurityContext,
        id: i64,
        is_active: bool,
    ) -> PanelResult<()> {
        self.gate(ctx, Operation::Write)?;
        let id = Self::require_id(id, "id")?;
        self.inner.set_active(id, is_active).await
    }

    /// List with untrusted filters. Every value passes through the
    /// sanitizer before query construction.
    pub async fn find_many(
        &self,
        ctx: &SecurityContext,
        raw_params: &Map<String, Value>,
    ) -> PanelResult<PaginatedResult<Tenant>> {
        self.gate(ctx, Operation::Read)?;

        let clean = params::sanitize(raw_params);
        let filters = TenantFilters {
            search: clean
                .get("search")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_active: clean.get("is_active").and_then(Value::as_bool),
            wedding_date_from: clean.get("wedding_date_from").and_then(params::parse_date),
            wedding_date_to: clean.get("wedding_date_to").and_then(params::parse_date),
        };
        let (offset, limit) = params::page_offset(&clean);

        self.inner.list(filters, Pagination { offset, limit }).await
    }

    /// Denormalized wedding facts for the AI prompt builder. Missing
    /// or deactivated tenants yield `None` rather than an error.
    pub async fn tenant_context(
        &self,
        ctx: &SecurityContext,
        tenant_id: i64,
    ) -> PanelResult<Option<TenantContext>> {
        self.gate(ctx, Operation::Read)?;
        let tenant_id = Self::require_id(tenant_id, "tenant_id")?;

        match self.inner.get_by_id(tenant_id).await {
            Ok(tenant) if tenant.is_active => {
                Ok(Some(TenantContext::from_tenant(&tenant, Utc::now())))
            }
            Ok(_) => Ok(None),
            Err(PanelError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
