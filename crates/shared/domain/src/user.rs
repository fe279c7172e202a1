//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_SUPER_ADMIN, ROLE_USER};
use crate::error::{DomainError, DomainResult};
use crate::password::Password;

/// User roles enumeration (tiered access).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Standard access
    #[default]
    User,
    /// Administrative access
    Admin,
    /// May manage other administrators
    SuperAdmin,
}

impl UserRole {
    /// Every role, lowest privilege first.
    pub const ALL: [UserRole; 3] = [UserRole::User, UserRole::Admin, UserRole::SuperAdmin];

    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => ROLE_USER,
            UserRole::Admin => ROLE_ADMIN,
            UserRole::SuperAdmin => ROLE_SUPER_ADMIN,
        }
    }

    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    /// Check if this role grants at least the privileges of `required`
    pub fn can_access(&self, required: &UserRole) -> bool {
        self.rank() >= required.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            UserRole::User => 0,
            UserRole::Admin => 1,
            UserRole::SuperAdmin => 2,
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(UserRole::User),
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            other => Err(DomainError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User as returned by default reads. Carries no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    #[cfg_attr(feature = "openapi", schema(example = "550e8400-e29b-41d4-a716-446655440000"))]
    pub id: Uuid,
    /// User email address
    #[cfg_attr(feature = "openapi", schema(example = "user@example.com"))]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// First and last name joined, when at least one is present.
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

/// Explicit opt-in projection that includes the stored password hash.
#[derive(Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl UserCredentials {
    /// Verify a plain text password against the stored hash.
    pub fn verify_password(&self, plain_text: &str) -> bool {
        Password::from_hash(self.password_hash.clone()).verify(plain_text)
    }
}

/// Data required to insert a user.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Storage default (`user`) when `None`
    pub role: Option<UserRole>,
    /// Storage default (`true`) when `None`
    pub is_active: Option<bool>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .finish()
    }
}

impl NewUser {
    /// New user with an already hashed password and storage defaults.
    pub fn new(email: impl Into<String>, password: Password) -> Self {
        Self {
            email: email.into(),
            password_hash: password.into_string(),
            first_name: None,
            last_name: None,
            role: None,
            is_active: None,
        }
    }

    /// Hash `plain_password` and build a new user from it.
    pub fn with_password(email: impl Into<String>, plain_password: &str) -> DomainResult<Self> {
        let email = email.into();
        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::validation("Email must be a valid address"));
        }
        Ok(Self::new(email, Password::new(plain_password)?))
    }

    pub fn named(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// The nullable name fields use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// True when the update would not change any field.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Query criteria for listing users. Empty criteria match every user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the email address
    pub email_contains: Option<String>,
}

impl UserFilter {
    pub fn role(role: UserRole) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            role: UserRole::User,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_role_round_trips_through_str() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!(UserRole::SuperAdmin.to_string(), "super_admin");
    }

    #[test]
    fn test_user_role_rejects_unknown_values() {
        assert!("root".parse::<UserRole>().is_err());
        assert!("Admin".parse::<UserRole>().is_err());
        assert!("".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_role_serde_values() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert!(serde_json::from_str::<UserRole>("\"owner\"").is_err());
    }

    #[test]
    fn test_user_role_default_is_user() {
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_user_role_access_ordering() {
        assert!(UserRole::SuperAdmin.can_access(&UserRole::Admin));
        assert!(UserRole::Admin.can_access(&UserRole::User));
        assert!(!UserRole::Admin.can_access(&UserRole::SuperAdmin));
        assert!(!UserRole::User.can_access(&UserRole::Admin));
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn test_user_json_never_contains_password() {
        let json = serde_json::to_value(sample_user()).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.contains_key("firstName"));
        assert!(object.contains_key("isActive"));
        assert!(object.contains_key("createdAt"));
        assert!(!object.keys().any(|k| k.to_lowercase().contains("password")));
    }

    #[test]
    fn test_full_name() {
        let mut user = sample_user();
        assert_eq!(user.full_name().as_deref(), Some("Ada"));
        user.last_name = Some("Lovelace".to_string());
        assert_eq!(user.full_name().as_deref(), Some("Ada Lovelace"));
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.full_name(), None);
    }

    #[test]
    fn test_new_user_with_password_hashes() {
        let new_user = NewUser::with_password("a@example.com", "SecurePass123").unwrap();
        assert_ne!(new_user.password_hash, "SecurePass123");
        assert!(Password::from_hash(new_user.password_hash.clone()).verify("SecurePass123"));
        assert_eq!(new_user.role, None);
        assert_eq!(new_user.is_active, None);
    }

    #[test]
    fn test_new_user_rejects_bad_input() {
        assert!(NewUser::with_password("not-an-email", "SecurePass123").is_err());
        assert!(NewUser::with_password("a@example.com", "short").is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = UserCredentials {
            user: sample_user(),
            password_hash: "$argon2id$secret".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("secret"));
    }

    #[cfg(feature = "openapi")]
    #[test]
    fn test_user_schema_carries_examples() {
        use utoipa::ToSchema;

        let (name, schema) = User::schema();
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(name, "User");
        assert_eq!(json["properties"]["email"]["example"], "user@example.com");
        assert!(json["properties"].get("passwordHash").is_none());
    }

    #[test]
    fn test_new_user_named() {
        let new_user = NewUser::with_password("a@example.com", "SecurePass123")
            .unwrap()
            .named("Ada", "Lovelace")
            .with_role(UserRole::Admin);

        assert_eq!(new_user.first_name.as_deref(), Some("Ada"));
        assert_eq!(new_user.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(new_user.role, Some(UserRole::Admin));
    }

    #[test]
    fn test_user_filter_constructors() {
        let filter = UserFilter::active(false);
        assert_eq!(filter.is_active, Some(false));
        assert_eq!(filter.role, None);
        assert_eq!(UserFilter::role(UserRole::Admin).role, Some(UserRole::Admin));
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());
        let update = UpdateUser {
            first_name: Some(None),
            ..UpdateUser::default()
        };
        assert!(!update.is_empty());
    }
}
