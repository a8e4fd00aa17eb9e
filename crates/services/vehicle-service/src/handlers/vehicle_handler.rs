//! Vehicle handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::{respond_with, ApiError, ApiResult, AppError, ValidatedJson};
use domain::{NewVehicle, Vehicle, VehicleType, VehicleUpdate};

use crate::state::AppState;

/// Register vehicle request
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 20, message = "License plate must be 1-20 characters"))]
    #[schema(example = "XYZ-1")]
    pub license_plate: String,
    pub user_id: i64,
    #[validate(length(min = 1, message = "Make is required"))]
    #[schema(example = "Toyota")]
    pub make: String,
    #[validate(length(min = 1, message = "Model is required"))]
    #[schema(example = "Corolla")]
    pub model: String,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: Option<i32>,
    pub color: Option<String>,
    /// Defaults to CAR
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(req: CreateVehicleRequest) -> Self {
        Self {
            license_plate: req.license_plate,
            user_id: req.user_id,
            make: req.make,
            model: req.model,
            year: req.year,
            color: req.color,
            vehicle_type: req.vehicle_type,
        }
    }
}

/// Descriptive replacement; owner and parking presence are kept
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 20, message = "License plate must be 1-20 characters"))]
    pub license_plate: String,
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100, message = "Year must be between 1900 and 2100"))]
    pub year: Option<i32>,
    pub color: Option<String>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
}

impl From<UpdateVehicleRequest> for VehicleUpdate {
    fn from(req: UpdateVehicleRequest) -> Self {
        Self {
            license_plate: req.license_plate,
            make: req.make,
            model: req.model,
            year: req.year,
            color: req.color,
            vehicle_type: req.vehicle_type,
        }
    }
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    #[schema(example = 5)]
    pub parking_space_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParkedCountResponse {
    pub parked_vehicles: u64,
}

/// Unknown vehicle is 404, every other rejection 400
fn update_failure(error: AppError) -> ApiError {
    let status = match error {
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    respond_with(status)(error)
}

/// Create vehicle routes
pub fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/license-plate/:license_plate", get(get_by_license_plate))
        .route("/user/:user_id", get(list_by_user))
        .route("/type/:vehicle_type", get(list_by_type))
        .route("/make/:make", get(list_by_make))
        .route("/make/:make/model/:model", get(list_by_make_and_model))
        .route("/parked", get(list_parked))
        .route("/parked/user/:user_id", get(list_parked_by_user))
        .route("/stats/parked-count", get(parked_count))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/entry", put(record_entry))
        .route("/:id/exit", put(record_exit))
}

/// List all vehicles
#[utoipa::path(
    get,
    path = "/api/vehicles",
    tag = "Vehicles",
    responses((status = 200, description = "All vehicles", body = Vec<Vehicle>))
)]
pub async fn list_vehicles(State(state): State<AppState>) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.vehicles.list_vehicles().await?))
}

/// Get vehicle by ID
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.vehicles.get_vehicle(id).await?))
}

/// Get vehicle by license plate
#[utoipa::path(
    get,
    path = "/api/vehicles/license-plate/{license_plate}",
    tag = "Vehicles",
    params(("license_plate" = String, Path, description = "License plate")),
    responses(
        (status = 200, description = "Vehicle", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn get_by_license_plate(
    State(state): State<AppState>,
    Path(license_plate): Path<String>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.vehicles.get_by_license_plate(&license_plate).await?))
}

/// List a user's vehicles
#[utoipa::path(
    get,
    path = "/api/vehicles/user/{user_id}",
    tag = "Vehicles",
    params(("user_id" = i64, Path, description = "Owner user ID")),
    responses((status = 200, description = "Owned vehicles", body = Vec<Vehicle>))
)]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.vehicles.list_by_user(user_id).await?))
}

/// List vehicles of one type
#[utoipa::path(
    get,
    path = "/api/vehicles/type/{vehicle_type}",
    tag = "Vehicles",
    params(("vehicle_type" = VehicleType, Path, description = "Vehicle type")),
    responses((status = 200, description = "Matching vehicles", body = Vec<Vehicle>))
)]
pub async fn list_by_type(
    State(state): State<AppState>,
    Path(vehicle_type): Path<VehicleType>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.vehicles.list_by_type(vehicle_type).await?))
}

/// List vehicles by make
#[utoipa::path(
    get,
    path = "/api/vehicles/make/{make}",
    tag = "Vehicles",
    params(("make" = String, Path, description = "Manufacturer, exact match")),
    responses((status = 200, description = "Matching vehicles", body = Vec<Vehicle>))
)]
pub async fn list_by_make(
    State(state): State<AppState>,
    Path(make): Path<String>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.vehicles.list_by_make(&make).await?))
}

/// List vehicles by make and model
#[utoipa::path(
    get,
    path = "/api/vehicles/make/{make}/model/{model}",
    tag = "Vehicles",
    params(
        ("make" = String, Path, description = "Manufacturer, exact match"),
        ("model" = String, Path, description = "Model, exact match")
    ),
    responses((status = 200, description = "Matching vehicles", body = Vec<Vehicle>))
)]
pub async fn list_by_make_and_model(
    State(state): State<AppState>,
    Path((make, model)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(
        state.vehicles.list_by_make_and_model(&make, &model).await?,
    ))
}

/// List parked vehicles
#[utoipa::path(
    get,
    path = "/api/vehicles/parked",
    tag = "Vehicles",
    responses((status = 200, description = "Vehicles with a current space", body = Vec<Vehicle>))
)]
pub async fn list_parked(State(state): State<AppState>) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.vehicles.list_parked().await?))
}

/// List a user's parked vehicles
#[utoipa::path(
    get,
    path = "/api/vehicles/parked/user/{user_id}",
    tag = "Vehicles",
    params(("user_id" = i64, Path, description = "Owner user ID")),
    responses((status = 200, description = "Parked vehicles", body = Vec<Vehicle>))
)]
pub async fn list_parked_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.vehicles.list_parked_by_user(user_id).await?))
}

/// Register a vehicle
#[utoipa::path(
    post,
    path = "/api/vehicles",
    tag = "Vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = Vehicle),
        (status = 400, description = "Invalid input or license plate taken")
    )
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateVehicleRequest>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = state
        .vehicles
        .create_vehicle(req.into())
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Replace a vehicle's descriptive fields
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = Vehicle),
        (status = 400, description = "Invalid input or license plate taken"),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateVehicleRequest>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = state
        .vehicles
        .update_vehicle(id, req.into())
        .await
        .map_err(update_failure)?;

    Ok(Json(vehicle))
}

/// Park a vehicle in a space
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}/entry",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = EntryRequest,
    responses(
        (status = 200, description = "Vehicle parked", body = Vehicle),
        (status = 400, description = "Missing space, unknown vehicle or already parked")
    )
)]
pub async fn record_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<EntryRequest>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = state
        .vehicles
        .record_entry(id, req.parking_space_id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(vehicle))
}

/// Take a vehicle out of its space
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}/exit",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle left its space", body = Vehicle),
        (status = 400, description = "Unknown vehicle or not parked")
    )
)]
pub async fn record_exit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = state
        .vehicles
        .record_exit(id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(vehicle))
}

/// Delete a vehicle that is not parked
#[utoipa::path(
    delete,
    path = "/api/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 400, description = "Unknown vehicle or currently parked")
    )
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .vehicles
        .delete_vehicle(id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Vehicles currently parked
#[utoipa::path(
    get,
    path = "/api/vehicles/stats/parked-count",
    tag = "Vehicles",
    responses((status = 200, description = "Parked vehicles", body = ParkedCountResponse))
)]
pub async fn parked_count(State(state): State<AppState>) -> ApiResult<Json<ParkedCountResponse>> {
    let parked_vehicles = state.vehicles.parked_count().await?;
    Ok(Json(ParkedCountResponse { parked_vehicles }))
}
