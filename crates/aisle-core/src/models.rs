//! Domain models for Aisle.
//!
//! These are the core types shared across all crates.

pub mod file;
pub mod guest;
pub mod import;
pub mod session;
pub mod tenant;
