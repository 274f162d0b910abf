//! Aisle Secure — security-gated repository facades.
//!
//! Every data operation in the panel goes through this crate: rate
//! limiting, access validation, parameter sanitization, and tenant
//! scope checks are composed in front of the storage repositories.

pub mod config;
pub mod guests;
pub mod ratelimit;
pub mod tenants;

pub use config::SecureConfig;
pub use guests::{GuestScope, SecureGuestRepository};
pub use ratelimit::{FixedWindowLimiter, NoopLimiter, RateDecision, RateLimiter};
pub use tenants::SecureTenantRepository;
