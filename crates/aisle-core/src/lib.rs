//! Aisle Core — domain models, repository traits, and the validation
//! primitives (access checks, tenant scope checks, parameter
//! sanitization) shared by every other crate.

pub mod error;
pub mod models;
pub mod params;
pub mod repository;
pub mod response;
pub mod security;
pub mod slug;

pub use error::{PanelError, PanelResult};
pub use security::{Operation, SecurityContext};
