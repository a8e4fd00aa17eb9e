//! Integration tests for the user API.
//!
//! These tests drive the router with a fake service, so no database is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{AppError, AppResult};
use domain::{User, UserType, UserUpdate};
use user_service_lib::routes::create_router;
use user_service_lib::service::{Registration, UserService};
use user_service_lib::state::AppState;

// =============================================================================
// Fake service
// =============================================================================

/// User 1 is alice (password `secret1`), user 2 is a deactivated owner,
/// anything else is missing.
struct FakeUserService;

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn fixture(id: i64) -> AppResult<User> {
    let (username, user_type, is_active) = match id {
        1 => ("alice", UserType::RegularUser, true),
        2 => ("owen", UserType::ParkingOwner, false),
        _ => return Err(AppError::not_found(format!("User with id {}", id))),
    };

    Ok(User {
        id,
        username: username.to_string(),
        email: format!("{}@x.com", username),
        password_hash: "$argon2id$v=19$fake".to_string(),
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
        phone_number: None,
        user_type,
        is_active,
        last_login: None,
        created_at: now(),
        updated_at: now(),
    })
}

#[async_trait]
impl UserService for FakeUserService {
    async fn get_user(&self, id: i64) -> AppResult<User> {
        fixture(id)
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        match username {
            "alice" => fixture(1),
            _ => Err(AppError::not_found(format!("User '{}'", username))),
        }
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        match email {
            "alice@x.com" => fixture(1),
            _ => Err(AppError::not_found(format!("User with email '{}'", email))),
        }
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(vec![fixture(1)?, fixture(2)?])
    }

    async fn list_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        let all = self.list_users().await?;
        Ok(all.into_iter().filter(|u| u.user_type == user_type).collect())
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        Ok(vec![fixture(1)?])
    }

    async fn list_active_by_type(&self, user_type: UserType) -> AppResult<Vec<User>> {
        let active = self.list_active().await?;
        Ok(active.into_iter().filter(|u| u.user_type == user_type).collect())
    }

    async fn search_by_name(&self, name: &str) -> AppResult<Vec<User>> {
        let all = self.list_users().await?;
        Ok(all.into_iter().filter(|u| u.name_contains(name)).collect())
    }

    async fn register(&self, registration: Registration) -> AppResult<User> {
        if registration.username == "alice" {
            return Err(AppError::conflict("Username 'alice'"));
        }
        let mut user = fixture(1)?;
        user.id = 10;
        user.username = registration.username;
        user.email = registration.email;
        user.user_type = registration.user_type;
        Ok(user)
    }

    async fn authenticate(&self, username_or_email: &str, password: &str) -> AppResult<User> {
        let user = match username_or_email {
            "alice" | "alice@x.com" => fixture(1)?,
            _ => return Err(AppError::Unauthorized),
        };
        if password != "secret1" {
            return Err(AppError::Unauthorized);
        }
        Ok(user.record_login(now()))
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> AppResult<User> {
        let user = fixture(id)?;
        if update.changes_username(&user) && update.username == "owen" {
            return Err(AppError::conflict("Username 'owen'"));
        }
        Ok(user.apply(update, now()))
    }

    async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        _new_password: &str,
    ) -> AppResult<User> {
        let user = fixture(id)?;
        if current_password != "secret1" {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    async fn activate(&self, id: i64) -> AppResult<User> {
        Ok(fixture(id)?.activate(now()))
    }

    async fn deactivate(&self, id: i64) -> AppResult<User> {
        Ok(fixture(id)?.deactivate(now()))
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        fixture(id).map(|_| ())
    }

    async fn active_users_count(&self) -> AppResult<u64> {
        Ok(1)
    }

    async fn parking_owners_count(&self) -> AppResult<u64> {
        Ok(0)
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app() -> Router {
    create_router(AppState::new(Arc::new(FakeUserService), None))
}

async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn register_body(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@x.com", username),
        "password": "secret1",
        "firstName": "First",
        "lastName": "Last"
    })
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_get_user_hides_password_hash() {
    let (status, body) = send("GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["userType"], "REGULAR_USER");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_lookups_by_username_and_email() {
    let (status, _) = send("GET", "/api/users/username/alice", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send("GET", "/api/users/email/alice@x.com", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send("GET", "/api/users/username/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_type_and_active_filters() {
    let (status, body) = send("GET", "/api/users/type/PARKING_OWNER", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send("GET", "/api/users/active/type/PARKING_OWNER", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let (status, body) = send("GET", "/api/users/active", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_search_by_name() {
    let (status, body) = send("GET", "/api/users/search?name=fir", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, _) = send("GET", "/api/users/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_bodies() {
    let (status, body) = send("GET", "/api/users/stats/active-users-count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "activeUsers": 1 }));

    let (_, body) = send("GET", "/api/users/stats/parking-owners-count", None).await;
    assert_eq!(body, json!({ "parkingOwners": 0 }));
}

// =============================================================================
// Registration and authentication
// =============================================================================

#[tokio::test]
async fn test_register_returns_201() {
    let (status, body) = send("POST", "/api/users/register", Some(register_body("bob"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "bob");
    assert_eq!(body["isActive"], true);
}

#[tokio::test]
async fn test_register_failures_are_400() {
    let (status, body) = send("POST", "/api/users/register", Some(register_body("alice"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let mut short = register_body("carol");
    short["password"] = json!("abc");
    let (status, _) = send("POST", "/api/users/register", Some(short)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_email = register_body("dave");
    bad_email["email"] = json!("not-an-email");
    let (status, _) = send("POST", "/api/users/register", Some(bad_email)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authenticate_success_and_failure() {
    let (status, body) = send(
        "POST",
        "/api/users/authenticate",
        Some(json!({ "usernameOrEmail": "alice", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["lastLogin"].is_string());

    let (status, body) = send(
        "POST",
        "/api/users/authenticate",
        Some(json!({ "usernameOrEmail": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_authenticate_missing_key_is_400() {
    let (status, _) = send(
        "POST",
        "/api/users/authenticate",
        Some(json!({ "usernameOrEmail": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Account changes
// =============================================================================

#[tokio::test]
async fn test_update_user_statuses() {
    let body = json!({
        "username": "alice",
        "email": "alice@new.com",
        "firstName": "Alice",
        "lastName": "Liddell"
    });
    let (status, updated) = send("PUT", "/api/users/1", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "alice@new.com");

    // Missing user and taken username both report 400
    let (status, _) = send("PUT", "/api/users/99", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let taken = json!({
        "username": "owen",
        "email": "alice@x.com",
        "firstName": "Alice",
        "lastName": "Liddell"
    });
    let (status, _) = send("PUT", "/api/users/1", Some(taken)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password_statuses() {
    let (status, _) = send(
        "PUT",
        "/api/users/1/change-password",
        Some(json!({ "currentPassword": "secret1", "newPassword": "secret2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        "PUT",
        "/api/users/1/change-password",
        Some(json!({ "currentPassword": "nope", "newPassword": "secret2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    let (status, _) = send(
        "PUT",
        "/api/users/1/change-password",
        Some(json!({ "currentPassword": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activate_and_deactivate() {
    let (status, body) = send("PUT", "/api/users/2/activate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], true);

    let (status, body) = send("PUT", "/api/users/1/deactivate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (status, _) = send("PUT", "/api/users/99/activate", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user() {
    let (status, _) = send("DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send("DELETE", "/api/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_without_database_is_healthy() {
    let (status, body) = send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "user-service");
}
