//! Application state for dependency injection.

use std::sync::Arc;

use database::Database;
use users::UserRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    /// Exported by the users module
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Create new app state.
    pub fn new(database: Database, users: Arc<dyn UserRepository>) -> Self {
        Self { database, users }
    }
}
