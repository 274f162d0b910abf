//! Tenant domain model.
//!
//! A tenant is one wedding. It is the isolation boundary for all guest
//! and media data: every scoped query carries a `tenant_id` predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One wedding account.
///
/// `is_active = false` is a soft delete: the row persists but is
/// excluded from default listings and blocks new guest writes. Tenant
/// rows are never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    /// URL-safe globally unique identifier, generated from the couple's
    /// names plus a random suffix (e.g. `amy-ben-x1y2z`).
    pub slug: String,
    pub bride_name: String,
    pub groom_name: String,
    pub wedding_date: DateTime<Utc>,
    pub venue_name: String,
    pub venue_address: String,
    pub venue_map_link: Option<String>,
    /// Theme colors as hex strings (e.g. `#d4a373`).
    pub primary_color: String,
    pub secondary_color: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant. The slug is generated
/// server-side, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub bride_name: String,
    pub groom_name: String,
    pub wedding_date: DateTime<Utc>,
    pub venue_name: String,
    pub venue_address: String,
    pub venue_map_link: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Fields that can be patched on an existing tenant. Unset fields keep
/// their current value; the storage layer rewrites the full row.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub bride_name: Option<String>,
    pub groom_name: Option<String>,
    pub wedding_date: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub venue_map_link: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateTenant {
    /// Merge this patch onto a loaded row, producing the full field set
    /// to write back.
    pub fn apply_to(self, mut current: Tenant) -> Tenant {
        if let Some(v) = self.bride_name {
            current.bride_name = v;
        }
        if let Some(v) = self.groom_name {
            current.groom_name = v;
        }
        if let Some(v) = self.wedding_date {
            current.wedding_date = v;
        }
        if let Some(v) = self.venue_name {
            current.venue_name = v;
        }
        if let Some(v) = self.venue_address {
            current.venue_address = v;
        }
        if let Some(v) = self.venue_map_link {
            current.venue_map_link = Some(v);
        }
        if let Some(v) = self.primary_color {
            current.primary_color = v;
        }
        if let Some(v) = self.secondary_color {
            current.secondary_color = v;
        }
        if let Some(v) = self.email {
            current.email = Some(v);
        }
        if let Some(v) = self.phone {
            current.phone = Some(v);
        }
        current
    }
}

/// Optional list filters. Unlike [`super::guest::GuestFilters`], every
/// field here is optional: tenant listings are global by design.
#[derive(Debug, Clone, Default)]
pub struct TenantFilters {
    /// Case-insensitive substring match over bride name, groom name,
    /// and slug.
    pub search: Option<String>,
    /// Explicit visibility filter. When unset, listings default to
    /// active tenants only.
    pub is_active: Option<bool>,
    pub wedding_date_from: Option<DateTime<Utc>>,
    pub wedding_date_to: Option<DateTime<Utc>>,
}

/// Denormalized projection consumed by the AI prompt builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub tenant_id: i64,
    pub slug: String,
    pub bride_name: String,
    pub groom_name: String,
    pub wedding_date: DateTime<Utc>,
    pub venue_name: String,
    pub venue_address: String,
    pub primary_color: String,
    pub secondary_color: String,
    /// Whole days from now until the wedding; negative once it has
    /// passed.
    pub days_until_wedding: i64,
}

impl TenantContext {
    pub fn from_tenant(tenant: &Tenant, now: DateTime<Utc>) -> Self {
        let days_until_wedding = (tenant.wedding_date.date_naive() - now.date_naive()).num_days();
        Self {
            tenant_id: tenant.id,
            slug: tenant.slug.clone(),
            bride_name: tenant.bride_name.clone(),
            groom_name: tenant.groom_name.clone(),
            wedding_date: tenant.wedding_date,
            venue_name: tenant.venue_name.clone(),
            venue_address: tenant.venue_address.clone(),
            primary_color: tenant.primary_color.clone(),
            secondary_color: tenant.secondary_color.clone(),
            days_until_wedding,
        }
    }
}
