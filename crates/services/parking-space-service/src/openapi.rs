//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::parking_space_handler::{
    AvailableCountResponse, CreateParkingSpaceRequest, ReserveRequest, UpdateParkingSpaceRequest,
};
use domain::{ParkingSpace, ParkingStatus};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::parking_space_handler::list_spaces,
        crate::handlers::parking_space_handler::get_space,
        crate::handlers::parking_space_handler::get_by_space_number,
        crate::handlers::parking_space_handler::list_available,
        crate::handlers::parking_space_handler::list_available_in_city_zone,
        crate::handlers::parking_space_handler::list_by_city,
        crate::handlers::parking_space_handler::list_by_zone,
        crate::handlers::parking_space_handler::list_by_owner,
        crate::handlers::parking_space_handler::create_space,
        crate::handlers::parking_space_handler::update_space,
        crate::handlers::parking_space_handler::reserve_space,
        crate::handlers::parking_space_handler::release_space,
        crate::handlers::parking_space_handler::occupy_space,
        crate::handlers::parking_space_handler::delete_space,
        crate::handlers::parking_space_handler::available_count,
    ),
    components(
        schemas(
            ParkingSpace,
            ParkingStatus,
            CreateParkingSpaceRequest,
            UpdateParkingSpaceRequest,
            ReserveRequest,
            AvailableCountResponse,
        )
    ),
    tags(
        (name = "Parking Spaces", description = "Parking space inventory and reservations"),
    )
)]
pub struct ApiDoc;
