//! User service - registration, authentication and account lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use common::{AppError, AppResult, Clock, OptionExt, SystemClock};
use domain::{NewUser, User, UserType, UserUpdate};

use crate::infra::{Argon2Hasher, PasswordHasher, UnitOfWork};

/// Registration data with the password still in plain text
#[derive(Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: i64) -> AppResult<User>;

    async fn get_by_username(&self, username: &str) -> AppResult<User>;

    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn list_by_type(&self, user_type: UserType) -> AppResult<Vec<User>>;

    async fn list_active(&self) -> AppResult<Vec<User>>;

    async fn list_active_by_type(&self, user_type: UserType) -> AppResult<Vec<User>>;

    async fn search_by_name(&self, name: &str) -> AppResult<Vec<User>>;

    /// Create an active account. Username and email must both be unused.
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Check credentials and stamp `last_login`.
    ///
    /// Unknown user, inactive account and wrong password all report
    /// `Unauthorized`.
    async fn authenticate(&self, username_or_email: &str, password: &str) -> AppResult<User>;

    /// Replace the profile; a changed username or email must be unused
    async fn update_user(&self, id: i64, update: UserUpdate) -> AppResult<User>;

    async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User>;

    async fn activate(&self, id: i64) -> AppResult<User>;

    async fn deactivate(&self, id: i64) -> AppResult<User>;

    async fn delete_user(&self, id: i64) -> AppResult<()>;

    /// Active REGULAR_USER accounts
    async fn active_users_count(&self) -> AppResult<u64>;

    /// Active PARKING_OWNER accounts
    async fn parking_owners_count(&self) -> AppResult<u64>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self::with_hasher(uow, Arc::new(Argon2Hasher), Arc::new(SystemClock))
    }

    pub fn with_hasher(
        uow: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { uow, hasher, clock }
    }

    async fn set_active(&self, id: i64, active: bool) -> AppResult<User> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let user = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(user_not_found(id))?;

                    let user = if active {
                        user.activate(now)
                    } else {
                        user.deactivate(now)
                    };
                    let saved = repo.save(user).await?;
                    info!(id, active, "User activity changed");
                    Ok(saved)
                })
            })
            .await
    }
}

fn user_not_found(id: i64) -> String {
    format!("User with id {}", id)
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i64) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found(user_not_found(id))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_by_username(username)
            .await?
            .ok_or_not_found(format!("User '{}'", username))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_by_email(email)
            .await?
            .ok_or_not_found(format!("User with email '{}'", email))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn list_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        self.uow.users().list_by_type(user_type).await
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        self.uow.users().list_active().await
    }

    async fn list_active_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        self.uow.users().list_active_by_type(user_type).await
    }

    async fn search_by_name(&self, name: &str) -> AppResult<Vec<User>> {
        self.uow.users().search_by_name(name).await
    }

    async fn register(&self, registration: Registration) -> AppResult<User> {
        let now = self.clock.now();
        let new_user = NewUser {
            password_hash: self.hasher.hash(&registration.password)?,
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            phone_number: registration.phone_number,
            user_type: registration.user_type,
        };

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    if repo.exists_by_username(&new_user.username).await? {
                        warn!(username = %new_user.username, "Username already taken");
                        return Err(AppError::conflict(format!(
                            "Username '{}'",
                            new_user.username
                        )));
                    }
                    if repo.exists_by_email(&new_user.email).await? {
                        warn!(email = %new_user.email, "Email already registered");
                        return Err(AppError::conflict(format!("Email '{}'", new_user.email)));
                    }

                    let created = repo.insert(new_user, now).await?;
                    info!(id = created.id, username = %created.username, "User registered");
                    Ok(created)
                })
            })
            .await
    }

    async fn authenticate(&self, username_or_email: &str, password: &str) -> AppResult<User> {
        let now = self.clock.now();
        let hasher = self.hasher.clone();
        let login = username_or_email.to_string();
        let password = password.to_string();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let Some(user) = repo.find_by_username_or_email(&login).await? else {
                        warn!(login = %login, "Authentication failed: unknown user");
                        return Err(AppError::Unauthorized);
                    };
                    if user.ensure_active().is_err() {
                        warn!(id = user.id, "Authentication failed: account deactivated");
                        return Err(AppError::Unauthorized);
                    }
                    if !hasher.verify(&password, &user.password_hash) {
                        warn!(id = user.id, "Authentication failed: wrong password");
                        return Err(AppError::Unauthorized);
                    }

                    let saved = repo.save(user.record_login(now)).await?;
                    info!(id = saved.id, "User authenticated");
                    Ok(saved)
                })
            })
            .await
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> AppResult<User> {
        let now = self.clock.now();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let user = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(user_not_found(id))?;

                    if update.changes_username(&user)
                        && repo.exists_by_username(&update.username).await?
                    {
                        warn!(id, username = %update.username, "Username already taken");
                        return Err(AppError::conflict(format!("Username '{}'", update.username)));
                    }
                    if update.changes_email(&user) && repo.exists_by_email(&update.email).await? {
                        warn!(id, email = %update.email, "Email already registered");
                        return Err(AppError::conflict(format!("Email '{}'", update.email)));
                    }

                    let saved = repo.save(user.apply(update, now)).await?;
                    info!(id, "User updated");
                    Ok(saved)
                })
            })
            .await
    }

    async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        let now = self.clock.now();
        let hasher = self.hasher.clone();
        let current_password = current_password.to_string();
        let new_password = new_password.to_string();

        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    let user = repo
                        .find_by_id(id)
                        .await?
                        .ok_or_not_found(user_not_found(id))?;

                    if !hasher.verify(&current_password, &user.password_hash) {
                        warn!(id, "Password change rejected: current password incorrect");
                        return Err(AppError::InvalidCredentials);
                    }

                    let hash = hasher.hash(&new_password)?;
                    let saved = repo.save(user.with_password_hash(hash, now)).await?;
                    info!(id, "Password changed");
                    Ok(saved)
                })
            })
            .await
    }

    async fn activate(&self, id: i64) -> AppResult<User> {
        self.set_active(id, true).await
    }

    async fn deactivate(&self, id: i64) -> AppResult<User> {
        self.set_active(id, false).await
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.uow
            .transaction(move |repo| {
                Box::pin(async move {
                    if !repo.delete(id).await? {
                        return Err(AppError::not_found(user_not_found(id)));
                    }
                    info!(id, "User deleted");
                    Ok(())
                })
            })
            .await
    }

    async fn active_users_count(&self) -> AppResult<u64> {
        self.uow
            .users()
            .count_active_by_type(UserType::RegularUser)
            .await
    }

    async fn parking_owners_count(&self) -> AppResult<u64> {
        self.uow
            .users()
            .count_active_by_type(UserType::ParkingOwner)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use common::FixedClock;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    use crate::infra::{MockPasswordHasher, TxFuture};
    use crate::repository::{MockUserRepository, UserRepository};

    /// Test UnitOfWork that runs transaction bodies straight against the mock
    struct TestUnitOfWork {
        repo: Arc<MockUserRepository>,
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn users(&self) -> Arc<dyn UserRepository> {
            self.repo.clone()
        }

        async fn transaction<F, T>(&self, f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(&'a dyn UserRepository) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            f(self.repo.as_ref()).await
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Hashes by prefixing and verifies by comparing
    fn fake_hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|plain| Ok(format!("hashed:{}", plain)));
        hasher
            .expect_verify()
            .returning(|plain, hash| hash == format!("hashed:{}", plain));
        hasher
    }

    fn manager(repo: MockUserRepository) -> UserManager<TestUnitOfWork> {
        UserManager::with_hasher(
            Arc::new(TestUnitOfWork {
                repo: Arc::new(repo),
            }),
            Arc::new(fake_hasher()),
            Arc::new(FixedClock::at(now())),
        )
    }

    fn alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "hashed:secret1".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            phone_number: None,
            user_type: UserType::RegularUser,
            is_active: true,
            last_login: None,
            created_at: now() - Duration::days(7),
            updated_at: now() - Duration::days(7),
        }
    }

    fn registration() -> Registration {
        Registration {
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password: "secret1".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            phone_number: None,
            user_type: UserType::RegularUser,
        }
    }

    fn update(username: &str, email: &str) -> UserUpdate {
        UserUpdate {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            phone_number: Some("555-0100".to_string()),
            user_type: UserType::RegularUser,
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_username().returning(|_| Ok(false));
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_insert().returning(|new, at| {
            assert_eq!(new.password_hash, "hashed:secret1");
            let mut user = alice();
            user.password_hash = new.password_hash;
            user.created_at = at;
            Ok(user)
        });

        let user = assert_ok!(manager(repo).register(registration()).await);
        assert!(user.is_active);
        assert_eq!(user.created_at, now());
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_username().returning(|_| Ok(true));
        repo.expect_exists_by_email().never();
        repo.expect_insert().never();

        let err = assert_err!(manager(repo).register(registration()).await);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_username().returning(|_| Ok(false));
        repo.expect_exists_by_email().returning(|_| Ok(true));
        repo.expect_insert().never();

        let err = assert_err!(manager(repo).register(registration()).await);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_authenticate_records_login() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username_or_email()
            .withf(|login| login == "alice")
            .returning(|_| Ok(Some(alice())));
        repo.expect_save().returning(Ok);

        let user = assert_ok!(manager(repo).authenticate("alice", "secret1").await);
        assert_eq!(user.last_login, Some(now()));
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_unauthorized() {
        // Wrong password
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username_or_email()
            .returning(|_| Ok(Some(alice())));
        repo.expect_save().never();
        let err = assert_err!(manager(repo).authenticate("alice", "wrong").await);
        assert!(matches!(err, AppError::Unauthorized));

        // Unknown user
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username_or_email().returning(|_| Ok(None));
        let err = assert_err!(manager(repo).authenticate("nobody", "secret1").await);
        assert!(matches!(err, AppError::Unauthorized));

        // Deactivated account with the right password
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username_or_email()
            .returning(|_| Ok(Some(alice().deactivate(now()))));
        repo.expect_save().never();
        let err = assert_err!(manager(repo).authenticate("a@x.com", "secret1").await);
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_change_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(alice())));
        repo.expect_save().returning(Ok);

        let user = assert_ok!(manager(repo).change_password(1, "secret1", "secret2").await);
        assert_eq!(user.password_hash, "hashed:secret2");
        assert_eq!(user.updated_at, now());
    }

    #[tokio::test]
    async fn test_change_password_wrong_current_is_invalid_credentials() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(alice())));
        repo.expect_save().never();

        let err = assert_err!(manager(repo).change_password(1, "nope", "secret2").await);
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_update_checks_only_changed_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(alice())));
        repo.expect_exists_by_username().never();
        repo.expect_exists_by_email()
            .withf(|email| email == "alice@new.com")
            .returning(|_| Ok(false));
        repo.expect_save().returning(Ok);

        let user = assert_ok!(
            manager(repo)
                .update_user(1, update("alice", "alice@new.com"))
                .await
        );
        assert_eq!(user.email, "alice@new.com");
        assert_eq!(user.password_hash, "hashed:secret1");
    }

    #[tokio::test]
    async fn test_update_to_taken_username_is_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(alice())));
        repo.expect_exists_by_username().returning(|_| Ok(true));
        repo.expect_save().never();

        let err = assert_err!(manager(repo).update_user(1, update("bob", "a@x.com")).await);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deactivate_then_activate() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(alice())));
        repo.expect_save().returning(Ok);
        let service = manager(repo);

        let user = assert_ok!(service.deactivate(1).await);
        assert!(!user.is_active);
        let user = assert_ok!(service.activate(1).await);
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().returning(|_| Ok(false));
        let service = manager(repo);

        assert!(matches!(
            assert_err!(service.activate(9).await),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            assert_err!(service.delete_user(9).await),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_counts_use_active_type() {
        let mut repo = MockUserRepository::new();
        repo.expect_count_active_by_type()
            .with(eq(UserType::RegularUser))
            .returning(|_| Ok(12));
        repo.expect_count_active_by_type()
            .with(eq(UserType::ParkingOwner))
            .returning(|_| Ok(3));
        let service = manager(repo);

        assert_eq!(assert_ok!(service.active_users_count().await), 12);
        assert_eq!(assert_ok!(service.parking_owners_count().await), 3);
    }
}
