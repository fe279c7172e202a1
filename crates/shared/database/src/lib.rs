//! Persistence infrastructure shared by feature modules.
//!
//! - [`Database`]: pooled connection built from [`common::DatabaseConfig`]
//! - [`EntityRegistry`]: explicit list of entities and enum types that feature
//!   modules contribute, used for schema auto-synchronization

mod connection;
mod registry;

pub use connection::Database;
pub use registry::{EntityRegistry, SyncReport};
