//! SurrealDB repository implementations.

mod guest;
mod media_file;
mod tenant;

pub use guest::SurrealGuestRepository;
pub use media_file::SurrealMediaFileRepository;
pub use tenant::SurrealTenantRepository;
