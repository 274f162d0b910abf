//! Error types for the Aisle panel.
//!
//! Errors are tagged variants carrying a human-readable message. Each
//! variant maps to a stable string code and an HTTP status so the
//! transport layer never has to parse messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Operation not permitted: {reason}")]
    Forbidden { reason: String },

    /// Record not found. The panel exposes a single 404 code for both
    /// tenant and guest misses; `entity` only disambiguates the message.
    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Slug already in use: {slug}")]
    DuplicateSlug { slug: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Cross-tenant access not permitted")]
    CrossTenantAccessDenied,

    #[error("Database error: {0}")]
    Database(String),
}

impl PanelError {
    /// Stable string code for the API error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            PanelError::Validation { .. } => "VALIDATION_ERROR",
            PanelError::Unauthorized => "UNAUTHORIZED",
            PanelError::Forbidden { .. } => "FORBIDDEN",
            PanelError::NotFound { .. } => "TENANT_NOT_FOUND",
            PanelError::DuplicateSlug { .. } => "DUPLICATE_SLUG",
            PanelError::RateLimited => "RATE_LIMIT_EXCEEDED",
            PanelError::CrossTenantAccessDenied => "CROSS_TENANT_ACCESS_DENIED",
            PanelError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status the transport layer should respond with.
    pub fn http_status(&self) -> u16 {
        match self {
            PanelError::Validation { .. } => 400,
            PanelError::Unauthorized => 401,
            PanelError::Forbidden { .. } => 403,
            PanelError::NotFound { .. } => 404,
            PanelError::DuplicateSlug { .. } => 409,
            PanelError::RateLimited => 429,
            PanelError::CrossTenantAccessDenied => 403,
            PanelError::Database(_) => 500,
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        PanelError::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a not-found failure.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        PanelError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type PanelResult<T> = Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_status_table() {
        let cases: &[(PanelError, &str, u16)] = &[
            (PanelError::validation("x"), "VALIDATION_ERROR", 400),
            (PanelError::Unauthorized, "UNAUTHORIZED", 401),
            (
                PanelError::Forbidden { reason: "x".into() },
                "FORBIDDEN",
                403,
            ),
            (PanelError::not_found("tenant", 7), "TENANT_NOT_FOUND", 404),
            (
                PanelError::DuplicateSlug {
                    slug: "amy-ben".into(),
                },
                "DUPLICATE_SLUG",
                409,
            ),
            (PanelError::RateLimited, "RATE_LIMIT_EXCEEDED", 429),
            (PanelError::Database("boom".into()), "DATABASE_ERROR", 500),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), *code);
            assert_eq!(err.http_status(), *status);
        }
    }

    #[test]
    fn guest_miss_uses_the_shared_not_found_code() {
        let err = PanelError::not_found("guest", 10);
        assert_eq!(err.code(), "TENANT_NOT_FOUND");
        assert_eq!(err.http_status(), 404);
    }
}
