//! Domain layer - Core entities and value objects.
//!
//! Pure domain vocabulary with no infrastructure dependencies. The ORM
//! mapping of these types lives in the `users` feature module.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use user::{NewUser, UpdateUser, User, UserCredentials, UserFilter, UserRole};
