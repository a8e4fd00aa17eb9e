//! User repository implementation.
//!
//! `UserStore` reads through the pool. `TxUserRepository` runs inside a unit
//! of work and locks rows it reads by id, username or email.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::AppResult;
use domain::{NewUser, User, UserType};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID. Locked for update inside a transaction.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Match `value` against username or email. Locked for update inside a transaction.
    async fn find_by_username_or_email(&self, value: &str) -> AppResult<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    async fn list(&self) -> AppResult<Vec<User>>;

    async fn list_by_type(&self, user_type: UserType) -> AppResult<Vec<User>>;

    async fn list_active(&self) -> AppResult<Vec<User>>;

    async fn list_active_by_type(&self, user_type: UserType) -> AppResult<Vec<User>>;

    /// Case-insensitive substring match on first or last name
    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<User>>;

    async fn count_active_by_type(&self, user_type: UserType) -> AppResult<u64>;

    /// Insert a new row stamped with `now`
    async fn insert(&self, user: NewUser, now: DateTime<Utc>) -> AppResult<User>;

    /// Write every column of an existing row
    async fn save(&self, user: User) -> AppResult<User>;

    /// Delete by id; `false` when no row matched
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Concrete implementation of UserRepository over the pool
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Transaction-aware user repository.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

// =============================================================================
// Queries
// =============================================================================

async fn find_one<C: ConnectionTrait>(
    conn: &C,
    filter: Condition,
    for_update: bool,
) -> AppResult<Option<User>> {
    let mut query = UserEntity::find().filter(filter);
    if for_update {
        query = query.lock_exclusive();
    }
    Ok(query.one(conn).await?.map(User::from))
}

async fn exists_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<bool> {
    Ok(UserEntity::find().filter(filter).count(conn).await? > 0)
}

async fn list_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<Vec<User>> {
    let models = UserEntity::find()
        .filter(filter)
        .order_by_asc(user::Column::Id)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(User::from).collect())
}

async fn count_where<C: ConnectionTrait>(conn: &C, filter: Condition) -> AppResult<u64> {
    Ok(UserEntity::find().filter(filter).count(conn).await?)
}

async fn insert<C: ConnectionTrait>(conn: &C, user: NewUser, now: DateTime<Utc>) -> AppResult<User> {
    let active_model = ActiveModel {
        username: Set(user.username),
        email: Set(user.email),
        password_hash: Set(user.password_hash),
        first_name: Set(user.first_name),
        last_name: Set(user.last_name),
        phone_number: Set(user.phone_number),
        user_type: Set(user.user_type.as_str().to_string()),
        is_active: Set(true),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = active_model.insert(conn).await?;
    Ok(User::from(model))
}

async fn save<C: ConnectionTrait>(conn: &C, user: User) -> AppResult<User> {
    let active_model = ActiveModel {
        id: Set(user.id),
        username: Set(user.username),
        email: Set(user.email),
        password_hash: Set(user.password_hash),
        first_name: Set(user.first_name),
        last_name: Set(user.last_name),
        phone_number: Set(user.phone_number),
        user_type: Set(user.user_type.as_str().to_string()),
        is_active: Set(user.is_active),
        last_login: Set(user.last_login),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    };

    let model = active_model.update(conn).await?;
    Ok(User::from(model))
}

async fn delete<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<bool> {
    let result = UserEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

fn by_id(id: i64) -> Condition {
    Condition::all().add(user::Column::Id.eq(id))
}

fn by_username(username: &str) -> Condition {
    Condition::all().add(user::Column::Username.eq(username))
}

fn by_email(email: &str) -> Condition {
    Condition::all().add(user::Column::Email.eq(email))
}

fn by_username_or_email(value: &str) -> Condition {
    Condition::any()
        .add(user::Column::Username.eq(value))
        .add(user::Column::Email.eq(value))
}

fn type_is(user_type: UserType) -> Condition {
    Condition::all().add(user::Column::UserType.eq(user_type.as_str()))
}

fn active() -> Condition {
    Condition::all().add(user::Column::IsActive.eq(true))
}

fn name_contains(fragment: &str) -> Condition {
    let pattern = format!("%{}%", fragment.to_lowercase());
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(user::Column::FirstName))).like(pattern.clone()))
        .add(Expr::expr(Func::lower(Expr::col(user::Column::LastName))).like(pattern))
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        find_one(&self.db, by_id(id), false).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_one(&self.db, by_username(username), false).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_one(&self.db, by_email(email), false).await
    }

    async fn find_by_username_or_email(&self, value: &str) -> AppResult<Option<User>> {
        find_one(&self.db, by_username_or_email(value), false).await
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        exists_where(&self.db, by_username(username)).await
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        exists_where(&self.db, by_email(email)).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        list_where(&self.db, Condition::all()).await
    }

    async fn list_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        list_where(&self.db, type_is(user_type)).await
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        list_where(&self.db, active()).await
    }

    async fn list_active_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        list_where(&self.db, active().add(type_is(user_type))).await
    }

    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<User>> {
        list_where(&self.db, Condition::all().add(name_contains(fragment))).await
    }

    async fn count_active_by_type(&self, user_type: UserType) -> AppResult<u64> {
        count_where(&self.db, active().add(type_is(user_type))).await
    }

    async fn insert(&self, user: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        insert(&self.db, user, now).await
    }

    async fn save(&self, user: User) -> AppResult<User> {
        save(&self.db, user).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(&self.db, id).await
    }
}

#[async_trait]
impl<'a> UserRepository for TxUserRepository<'a> {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        find_one(self.txn, by_id(id), true).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_one(self.txn, by_username(username), true).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_one(self.txn, by_email(email), true).await
    }

    async fn find_by_username_or_email(&self, value: &str) -> AppResult<Option<User>> {
        find_one(self.txn, by_username_or_email(value), true).await
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        exists_where(self.txn, by_username(username)).await
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        exists_where(self.txn, by_email(email)).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        list_where(self.txn, Condition::all()).await
    }

    async fn list_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        list_where(self.txn, type_is(user_type)).await
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        list_where(self.txn, active()).await
    }

    async fn list_active_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        list_where(self.txn, active().add(type_is(user_type))).await
    }

    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<User>> {
        list_where(self.txn, Condition::all().add(name_contains(fragment))).await
    }

    async fn count_active_by_type(&self, user_type: UserType) -> AppResult<u64> {
        count_where(self.txn, active().add(type_is(user_type))).await
    }

    async fn insert(&self, user: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        insert(self.txn, user, now).await
    }

    async fn save(&self, user: User) -> AppResult<User> {
        save(self.txn, user).await
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        delete(self.txn, id).await
    }
}
