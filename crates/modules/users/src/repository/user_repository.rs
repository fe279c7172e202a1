//! User repository implementation.
//!
//! Default reads go through [`default_select`], which only selects the columns
//! tagged as part of the default projection. The password hash is returned by
//! [`UserRepository::find_credentials_by_email`] and nowhere else.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity, Profile, Role};
use common::{AppError, AppResult};
use domain::{NewUser, UpdateUser, User, UserCredentials, UserFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Conflict subject reported when the email unique constraint fires
const EMAIL: &str = "Email";

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A duplicate email is a conflict.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by exact email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by email together with the stored password hash
    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    /// Apply a partial update. An empty update returns the stored user.
    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// List users matching `filter`, oldest first
    async fn list(&self, filter: UserFilter) -> AppResult<Vec<User>>;

    /// Count users matching `filter`
    async fn count(&self, filter: UserFilter) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `SELECT` over the default projection only.
pub(crate) fn default_select() -> Select<UserEntity> {
    UserEntity::find()
        .select_only()
        .columns(user::Column::default_projection())
}

/// Restrict `select` to users matching `filter`. Empty criteria add no
/// `WHERE` clause at all.
pub(crate) fn apply_filter(select: Select<UserEntity>, filter: &UserFilter) -> Select<UserEntity> {
    let condition = filter_condition(filter);
    if condition.is_empty() {
        select
    } else {
        select.filter(condition)
    }
}

fn filter_condition(filter: &UserFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(role) = filter.role {
        condition = condition.add(user::Column::Role.eq(Role::from(role)));
    }
    if let Some(is_active) = filter.is_active {
        condition = condition.add(user::Column::IsActive.eq(is_active));
    }
    if let Some(fragment) = filter
        .email_contains
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
    {
        let pattern = format!("%{}%", escape_like(&fragment.to_lowercase()));
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col((UserEntity, user::Column::Email))))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    condition
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut active = <ActiveModel as ActiveModelBehavior>::new();
        active.email = Set(new_user.email);
        active.password_hash = Set(new_user.password_hash);
        active.first_name = Set(new_user.first_name);
        active.last_name = Set(new_user.last_name);
        if let Some(role) = new_user.role {
            active.role = Set(role.into());
        }
        if let Some(is_active) = new_user.is_active {
            active.is_active = Set(is_active);
        }

        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_db_unique(e, EMAIL))?;

        tracing::debug!(user_id = %model.id, "User created");
        Ok(User::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = default_select()
            .filter(user::Column::Id.eq(id))
            .into_model::<Profile>()
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = default_select()
            .filter(user::Column::Email.eq(email))
            .into_model::<Profile>()
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(UserCredentials::from))
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        if changes.is_empty() {
            return self.find_by_id(id).await?.ok_or(AppError::NotFound);
        }

        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = user.into();

        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(role) = changes.role {
            active.role = Set(role.into());
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_db_unique(e, EMAIL))?;
        Ok(User::from(model))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let active = ActiveModel {
            id: ActiveValue::Unchanged(id),
            password_hash: Set(password_hash),
            ..<ActiveModel as ActiveModelTrait>::default()
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound),
            Err(e) => Err(AppError::from(e)),
        }
    }

    async fn list(&self, filter: UserFilter) -> AppResult<Vec<User>> {
        let rows = apply_filter(default_select(), &filter)
            .order_by_asc(user::Column::CreatedAt)
            .into_model::<Profile>()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count(&self, filter: UserFilter) -> AppResult<u64> {
        apply_filter(UserEntity::find(), &filter)
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }
}
