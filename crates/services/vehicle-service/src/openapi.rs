//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::vehicle_handler::{
    CreateVehicleRequest, EntryRequest, ParkedCountResponse, UpdateVehicleRequest,
};
use domain::{Vehicle, VehicleType};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::vehicle_handler::list_vehicles,
        crate::handlers::vehicle_handler::get_vehicle,
        crate::handlers::vehicle_handler::get_by_license_plate,
        crate::handlers::vehicle_handler::list_by_user,
        crate::handlers::vehicle_handler::list_by_type,
        crate::handlers::vehicle_handler::list_by_make,
        crate::handlers::vehicle_handler::list_by_make_and_model,
        crate::handlers::vehicle_handler::list_parked,
        crate::handlers::vehicle_handler::list_parked_by_user,
        crate::handlers::vehicle_handler::create_vehicle,
        crate::handlers::vehicle_handler::update_vehicle,
        crate::handlers::vehicle_handler::record_entry,
        crate::handlers::vehicle_handler::record_exit,
        crate::handlers::vehicle_handler::delete_vehicle,
        crate::handlers::vehicle_handler::parked_count,
    ),
    components(
        schemas(
            Vehicle,
            VehicleType,
            CreateVehicleRequest,
            UpdateVehicleRequest,
            EntryRequest,
            ParkedCountResponse,
        )
    ),
    tags(
        (name = "Vehicles", description = "Vehicle registry and parking presence"),
    )
)]
pub struct ApiDoc;
