//! User database entity for SeaORM.
//!
//! Column attributes here are the storage descriptor of the `users` table:
//! uniqueness, nullability, defaults and the Postgres `user_role` enum.

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use sea_orm::{FromQueryResult, Iterable};

use domain::{User, UserCredentials, UserRole};

/// Storage representation of [`UserRole`], backed by the `user_role` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => Role::User,
            UserRole::Admin => Role::Admin,
            UserRole::SuperAdmin => Role::SuperAdmin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => UserRole::User,
            Role::Admin => UserRole::Admin,
            Role::SuperAdmin => UserRole::SuperAdmin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    /// Never part of the default projection
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sea_orm(default_value = "user")]
    pub role: Role,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Column {
    /// Whether default reads return this column. The password hash is opt-in.
    pub fn is_selected_by_default(&self) -> bool {
        !matches!(self, Column::PasswordHash)
    }

    /// Columns of the default read projection, in declaration order.
    pub fn default_projection() -> impl Iterator<Item = Column> {
        Column::iter().filter(Column::is_selected_by_default)
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Fresh model with a generated id and the column defaults applied.
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            role: Set(Role::User),
            is_active: Set(true),
            ..<Self as ActiveModelTrait>::default()
        }
    }

    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.stamp(insert, chrono::Utc::now())
    }
}

impl ActiveModel {
    /// Apply audit timestamps.
    ///
    /// Inserts get a fresh `created_at`/`updated_at` pair. Updates refresh
    /// `updated_at` and must not reassign `id` or `created_at`.
    pub(crate) fn stamp(mut self, insert: bool, now: DateTimeUtc) -> Result<Self, DbErr> {
        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            self.created_at = Set(now);
            self.updated_at = Set(now);
        } else {
            if self.id.is_set() {
                return Err(DbErr::Custom("users.id is immutable".to_string()));
            }
            if self.created_at.is_set() {
                return Err(DbErr::Custom("users.created_at is immutable".to_string()));
            }
            self.updated_at = Set(now);
        }
        Ok(self)
    }
}

/// Row shape of the default projection.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Profile> for User {
    fn from(row: Profile) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role.into(),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Drops the password hash.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role.into(),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Model> for UserCredentials {
    fn from(mut model: Model) -> Self {
        let password_hash = std::mem::take(&mut model.password_hash);
        UserCredentials {
            user: model.into(),
            password_hash,
        }
    }
}
