//! Users feature module.
//!
//! Owns the `users` table and its `user_role` enum type, and exports the
//! repository handle to sibling modules. Exposes no HTTP endpoints.

use std::sync::Arc;

use database::EntityRegistry;
use sea_orm::DatabaseConnection;

use crate::repository::entities::user::{Entity as UserEntity, Role};
use crate::repository::{UserRepository, UserStore};

/// Composition root of the users feature.
#[derive(Clone)]
pub struct UsersModule {
    repository: Arc<dyn UserRepository>,
}

impl UsersModule {
    /// Build the module over an open connection.
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_repository(Arc::new(UserStore::new(db)))
    }

    /// Build the module around an existing repository (mocks in tests).
    pub fn with_repository(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Register the schema objects this module owns. The enum type goes
    /// first since the table depends on it.
    pub fn register_entities(registry: &mut EntityRegistry) {
        registry
            .register_enum::<Role>()
            .register_entity(UserEntity);
    }

    /// Repository handle exported to other modules.
    pub fn repository(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.repository)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbBackend;
    use uuid::Uuid;

    use super::*;
    use crate::repository::MockUserRepository;

    #[test]
    fn test_register_entities() {
        let mut registry = EntityRegistry::new();
        UsersModule::register_entities(&mut registry);
        UsersModule::register_entities(&mut registry);

        assert_eq!(registry.enums().collect::<Vec<_>>(), vec!["user_role"]);
        assert_eq!(registry.tables().collect::<Vec<_>>(), vec!["users"]);

        let statements = registry.create_statements(DbBackend::Postgres);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("'super_admin'"));
        assert!(statements[1].contains("\"users\""));
    }

    #[tokio::test]
    async fn test_repository_handle_is_shared() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().times(2).returning(|_| Ok(None));

        let module = UsersModule::with_repository(Arc::new(repo));
        let id = Uuid::new_v4();

        assert!(module.repository().find_by_id(id).await.unwrap().is_none());
        assert!(module.clone().repository().find_by_id(id).await.unwrap().is_none());
    }
}
