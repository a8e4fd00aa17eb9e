//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::user_handler::{
    ActiveUsersResponse, AuthenticateRequest, ChangePasswordRequest, ParkingOwnersResponse,
    RegisterRequest, UpdateUserRequest,
};
use domain::{User, UserType};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::get_by_username,
        crate::handlers::user_handler::get_by_email,
        crate::handlers::user_handler::list_by_type,
        crate::handlers::user_handler::list_active,
        crate::handlers::user_handler::list_active_by_type,
        crate::handlers::user_handler::search_users,
        crate::handlers::user_handler::register_user,
        crate::handlers::user_handler::authenticate_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::change_password,
        crate::handlers::user_handler::activate_user,
        crate::handlers::user_handler::deactivate_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::active_users_count,
        crate::handlers::user_handler::parking_owners_count,
    ),
    components(
        schemas(
            User,
            UserType,
            RegisterRequest,
            AuthenticateRequest,
            UpdateUserRequest,
            ChangePasswordRequest,
            ActiveUsersResponse,
            ParkingOwnersResponse,
        )
    ),
    tags(
        (name = "Users", description = "Accounts, authentication and activity"),
    )
)]
pub struct ApiDoc;
