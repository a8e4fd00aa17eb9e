//! User handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::{respond_with, ApiResult, ValidatedJson};
use domain::{User, UserType, UserUpdate};

use crate::service::Registration;
use crate::state::AppState;

/// Register user request
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret1")]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone_number: Option<String>,
    /// Defaults to REGULAR_USER
    #[serde(default)]
    pub user_type: UserType,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            user_type: req.user_type,
        }
    }
}

/// Credentials; both keys are required
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    #[schema(example = "alice")]
    pub username_or_email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

/// Full profile replacement
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            user_type: req.user_type,
        }
    }
}

/// Password change; both keys are required
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Fragment of a first or last name
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUsersResponse {
    pub active_users: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParkingOwnersResponse {
    pub parking_owners: u64,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register_user))
        .route("/authenticate", post(authenticate_user))
        .route("/username/:username", get(get_by_username))
        .route("/email/:email", get(get_by_email))
        .route("/type/:user_type", get(list_by_type))
        .route("/active", get(list_active))
        .route("/active/type/:user_type", get(list_active_by_type))
        .route("/search", get(search_users))
        .route("/stats/active-users-count", get(active_users_count))
        .route("/stats/parking-owners-count", get(parking_owners_count))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/change-password", put(change_password))
        .route("/:id/activate", put(activate_user))
        .route("/:id/deactivate", put(deactivate_user))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "All users", body = Vec<User>))
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_users().await?))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get_user(id).await?))
}

/// Get user by username
#[utoipa::path(
    get,
    path = "/api/users/username/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get_by_username(&username).await?))
}

/// Get user by email
#[utoipa::path(
    get,
    path = "/api/users/email/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "Email address")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get_by_email(&email).await?))
}

/// List users of one type
#[utoipa::path(
    get,
    path = "/api/users/type/{user_type}",
    tag = "Users",
    params(("user_type" = UserType, Path, description = "User type")),
    responses((status = 200, description = "Matching users", body = Vec<User>))
)]
pub async fn list_by_type(
    State(state): State<AppState>,
    Path(user_type): Path<UserType>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_by_type(user_type).await?))
}

/// List active users
#[utoipa::path(
    get,
    path = "/api/users/active",
    tag = "Users",
    responses((status = 200, description = "Active users", body = Vec<User>))
)]
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_active().await?))
}

/// List active users of one type
#[utoipa::path(
    get,
    path = "/api/users/active/type/{user_type}",
    tag = "Users",
    params(("user_type" = UserType, Path, description = "User type")),
    responses((status = 200, description = "Matching users", body = Vec<User>))
)]
pub async fn list_active_by_type(
    State(state): State<AppState>,
    Path(user_type): Path<UserType>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_active_by_type(user_type).await?))
}

/// Search users by first or last name
#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "Users",
    params(SearchQuery),
    responses((status = 200, description = "Matching users", body = Vec<User>))
)]
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.search_by_name(&query.name).await?))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input, username or email taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state
        .users
        .register(req.into())
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticate with username or email
#[utoipa::path(
    post,
    path = "/api/users/authenticate",
    tag = "Users",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 400, description = "Missing credential key"),
        (status = 401, description = "Authentication failed")
    )
)]
pub async fn authenticate_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AuthenticateRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .authenticate(&req.username_or_email, &req.password)
        .await
        .map_err(respond_with(StatusCode::UNAUTHORIZED))?;

    Ok(Json(user))
}

/// Replace a user's profile
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid input, unknown user or username/email taken")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .update_user(id, req.into())
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(user))
}

/// Change a user's password
#[utoipa::path(
    put,
    path = "/api/users/{id}/change-password",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = User),
        (status = 400, description = "Missing key, unknown user or wrong current password")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .change_password(id, &req.current_password, &req.new_password)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(user))
}

/// Activate a user
#[utoipa::path(
    put,
    path = "/api/users/{id}/activate",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User activated", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .activate(id)
        .await
        .map_err(respond_with(StatusCode::NOT_FOUND))?;

    Ok(Json(user))
}

/// Deactivate a user
#[utoipa::path(
    put,
    path = "/api/users/{id}/deactivate",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .deactivate(id)
        .await
        .map_err(respond_with(StatusCode::NOT_FOUND))?;

    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state
        .users
        .delete_user(id)
        .await
        .map_err(respond_with(StatusCode::NOT_FOUND))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Active regular users
#[utoipa::path(
    get,
    path = "/api/users/stats/active-users-count",
    tag = "Users",
    responses((status = 200, description = "Active regular users", body = ActiveUsersResponse))
)]
pub async fn active_users_count(
    State(state): State<AppState>,
) -> ApiResult<Json<ActiveUsersResponse>> {
    let active_users = state.users.active_users_count().await?;
    Ok(Json(ActiveUsersResponse { active_users }))
}

/// Active parking owners
#[utoipa::path(
    get,
    path = "/api/users/stats/parking-owners-count",
    tag = "Users",
    responses((status = 200, description = "Active parking owners", body = ParkingOwnersResponse))
)]
pub async fn parking_owners_count(
    State(state): State<AppState>,
) -> ApiResult<Json<ParkingOwnersResponse>> {
    let parking_owners = state.users.parking_owners_count().await?;
    Ok(Json(ParkingOwnersResponse { parking_owners }))
}
