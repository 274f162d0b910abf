//! Session collaborator types.
//!
//! The session itself is owned by an external provider (the web
//! framework's auth layer); the panel only consumes its shape to
//! derive a per-request [`crate::security::SecurityContext`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal view of the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Opaque server session as returned by the provider. A session with
/// no user is treated as unauthenticated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<SessionUser>,
}
