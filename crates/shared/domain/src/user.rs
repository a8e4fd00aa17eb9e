//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const REGULAR_USER: &str = "REGULAR_USER";
const PARKING_OWNER: &str = "PARKING_OWNER";
const ADMIN: &str = "ADMIN";

/// Kind of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[default]
    RegularUser,
    ParkingOwner,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::RegularUser => REGULAR_USER,
            UserType::ParkingOwner => PARKING_OWNER,
            UserType::Admin => ADMIN,
        }
    }
}

impl From<&str> for UserType {
    fn from(s: &str) -> Self {
        match s {
            PARKING_OWNER => UserType::ParkingOwner,
            ADMIN => UserType::Admin,
            _ => UserType::RegularUser,
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Guard used by `authenticate`
    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    pub fn activate(self, now: DateTime<Utc>) -> Self {
        Self {
            is_active: true,
            updated_at: now,
            ..self
        }
    }

    pub fn deactivate(self, now: DateTime<Utc>) -> Self {
        Self {
            is_active: false,
            updated_at: now,
            ..self
        }
    }

    /// Stamp a successful login
    pub fn record_login(self, now: DateTime<Utc>) -> Self {
        Self {
            last_login: Some(now),
            ..self
        }
    }

    /// Replace the stored hash
    pub fn with_password_hash(self, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            password_hash,
            updated_at: now,
            ..self
        }
    }

    /// Replace the profile fields. Activity and password are untouched.
    pub fn apply(self, update: UserUpdate, now: DateTime<Utc>) -> Self {
        Self {
            username: update.username,
            email: update.email,
            first_name: update.first_name,
            last_name: update.last_name,
            phone_number: update.phone_number,
            user_type: update.user_type,
            updated_at: now,
            ..self
        }
    }

    /// Case-insensitive match on first or last name
    pub fn name_contains(&self, fragment: &str) -> bool {
        let needle = fragment.to_lowercase();
        self.first_name.to_lowercase().contains(&needle)
            || self.last_name.to_lowercase().contains(&needle)
    }
}

/// Registration data with the password already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
}

/// Full profile replacement
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
}

impl UserUpdate {
    pub fn changes_username(&self, current: &User) -> bool {
        self.username != current.username
    }

    pub fn changes_email(&self, current: &User) -> bool {
        self.email != current.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn alice() -> User {
        let created = Utc::now() - Duration::days(3);
        User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            phone_number: None,
            user_type: UserType::RegularUser,
            is_active: true,
            last_login: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_serialization_hides_password_hash() {
        let json = serde_json::to_value(alice()).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["userType"], "REGULAR_USER");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_deactivate_then_activate() {
        let now = Utc::now();
        let user = alice().deactivate(now);
        assert!(!user.is_active);
        assert_eq!(user.ensure_active(), Err(DomainError::Unauthorized));

        let user = user.activate(now);
        assert!(user.is_active);
        assert!(user.ensure_active().is_ok());
    }

    #[test]
    fn test_record_login() {
        let now = Utc::now();
        assert_eq!(alice().record_login(now).last_login, Some(now));
    }

    #[test]
    fn test_update_change_detection() {
        let user = alice();
        let update = UserUpdate {
            username: "alice".to_string(),
            email: "alice@new.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "L".to_string(),
            phone_number: Some("555".to_string()),
            user_type: UserType::ParkingOwner,
        };

        assert!(!update.changes_username(&user));
        assert!(update.changes_email(&user));

        let updated = user.apply(update, Utc::now());
        assert_eq!(updated.email, "alice@new.com");
        assert_eq!(updated.user_type, UserType::ParkingOwner);
        assert!(updated.is_active);
    }

    #[test]
    fn test_name_search_is_case_insensitive() {
        let user = alice();
        assert!(user.name_contains("ali"));
        assert!(user.name_contains("DDE"));
        assert!(!user.name_contains("bob"));
    }

    #[test]
    fn test_user_type_storage_string() {
        assert_eq!(UserType::from("PARKING_OWNER"), UserType::ParkingOwner);
        assert_eq!(UserType::Admin.to_string(), "ADMIN");
        assert_eq!(UserType::from("unknown"), UserType::RegularUser);
    }
}
