//! Per-request security context and the two gate checks every data
//! operation passes through: access validation and tenant scope
//! validation.

use serde::{Deserialize, Serialize};

use crate::error::{PanelError, PanelResult};
use crate::models::session::Session;

/// Operation class used by access validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
        }
    }
}

/// Ephemeral authentication/authorization facts, derived once per
/// request and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityContext {
    pub is_authenticated: bool,
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl SecurityContext {
    /// Derive a context from the external session lookup.
    ///
    /// Policy: the panel has exactly one role, so any authenticated
    /// user is implicitly an admin.
    pub fn from_session(session: Option<&Session>) -> Self {
        match session.and_then(|s| s.user.as_ref()) {
            Some(user) => Self {
                is_authenticated: true,
                user_id: Some(user.id.to_string()),
                is_admin: true,
            },
            None => Self::default(),
        }
    }

    /// Context for an already-authenticated admin, used by trusted
    /// in-process callers (e.g. the agent dispatcher after its own
    /// session check).
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user_id.into()),
            is_admin: true,
        }
    }

    /// Rate-limit key for this caller.
    pub fn limiter_key(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }
}

/// Gate check run at the top of every repository method. Fails closed
/// when the caller is unauthenticated; the admin check exists for
/// completeness, not fine-grained roles.
pub fn validate_access(ctx: &SecurityContext, operation: Operation) -> PanelResult<()> {
    if !ctx.is_authenticated {
        return Err(PanelError::Unauthorized);
    }
    if !ctx.is_admin {
        return Err(PanelError::Forbidden {
            reason: format!("{} requires admin access", operation.as_str()),
        });
    }
    Ok(())
}

/// Last line of defense against cross-tenant id guessing: compare the
/// tenant id the caller asserted against the tenant id stored on the
/// loaded record.
pub fn validate_scope(requested_tenant_id: i64, actual_tenant_id: i64) -> PanelResult<()> {
    if requested_tenant_id != actual_tenant_id {
        return Err(PanelError::CrossTenantAccessDenied);
    }
    Ok(())
}
