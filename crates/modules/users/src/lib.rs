//! Users feature module.
//!
//! Persists the `User` entity with SeaORM and exposes a [`UserRepository`]
//! to the rest of the application through [`UsersModule`].

pub mod module;
pub mod repository;

pub use module::UsersModule;
pub use repository::entities::user as entity;
#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockUserRepository;
pub use repository::{UserRepository, UserStore};
