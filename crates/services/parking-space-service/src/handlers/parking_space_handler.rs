//! Parking space handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use common::{respond_with, ApiResult, ValidatedJson};
use domain::{
    check_hourly_rate, NewParkingSpace, ParkingSpace, ParkingSpaceUpdate, ParkingStatus,
    DEFAULT_RESERVATION_HOURS,
};

use crate::state::AppState;

fn storable_rate(rate: &Decimal) -> Result<(), ValidationError> {
    check_hourly_rate(*rate).map_err(|e| {
        let mut error = ValidationError::new("hourly_rate");
        error.message = Some(e.to_string().into());
        error
    })
}

/// Create parking space request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParkingSpaceRequest {
    #[validate(length(min = 1, message = "Space number is required"))]
    #[schema(example = "A1")]
    pub space_number: String,
    #[validate(length(min = 1, message = "Location is required"))]
    #[schema(example = "Level 1, Bay 4")]
    pub location: String,
    #[validate(length(min = 1, message = "City is required"))]
    #[schema(example = "Colombo")]
    pub city: String,
    pub zone: Option<String>,
    #[validate(custom(function = "storable_rate"))]
    #[schema(example = "2.00")]
    pub hourly_rate: Decimal,
    pub owner_id: Option<i64>,
    /// Defaults to AVAILABLE
    pub status: Option<ParkingStatus>,
}

impl From<CreateParkingSpaceRequest> for NewParkingSpace {
    fn from(req: CreateParkingSpaceRequest) -> Self {
        Self {
            space_number: req.space_number,
            location: req.location,
            city: req.city,
            zone: req.zone,
            hourly_rate: req.hourly_rate,
            owner_id: req.owner_id,
            status: req.status,
        }
    }
}

/// Full update of a parking space. The space number is not updatable.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParkingSpaceRequest {
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    pub zone: Option<String>,
    #[validate(custom(function = "storable_rate"))]
    pub hourly_rate: Decimal,
    pub status: ParkingStatus,
}

impl From<UpdateParkingSpaceRequest> for ParkingSpaceUpdate {
    fn from(req: UpdateParkingSpaceRequest) -> Self {
        Self {
            location: req.location,
            city: req.city,
            zone: req.zone,
            hourly_rate: req.hourly_rate,
            status: req.status,
        }
    }
}

/// Reservation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    /// Hours to hold the space; defaults to 1
    #[validate(range(min = 1, max = 8760, message = "Duration must be 1 to 8760 hours"))]
    #[schema(example = 2)]
    pub duration_hours: Option<i64>,
}

/// Available space count for a city
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCountResponse {
    pub available_spaces: u64,
}

/// Create parking space routes
pub fn parking_space_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_spaces).post(create_space))
        .route("/available", get(list_available))
        .route(
            "/available/city/:city/zone/:zone",
            get(list_available_in_city_zone),
        )
        .route("/space-number/:space_number", get(get_by_space_number))
        .route("/city/:city", get(list_by_city))
        .route("/zone/:zone", get(list_by_zone))
        .route("/owner/:owner_id", get(list_by_owner))
        .route("/stats/available-count/city/:city", get(available_count))
        .route(
            "/:id",
            get(get_space).put(update_space).delete(delete_space),
        )
        .route("/:id/reserve", put(reserve_space))
        .route("/:id/release", put(release_space))
        .route("/:id/occupy", put(occupy_space))
}

/// List all parking spaces
#[utoipa::path(
    get,
    path = "/api/parking-spaces",
    tag = "Parking Spaces",
    responses(
        (status = 200, description = "All parking spaces", body = Vec<ParkingSpace>)
    )
)]
pub async fn list_spaces(State(state): State<AppState>) -> ApiResult<Json<Vec<ParkingSpace>>> {
    Ok(Json(state.parking_spaces.list_spaces().await?))
}

/// Get parking space by ID
#[utoipa::path(
    get,
    path = "/api/parking-spaces/{id}",
    tag = "Parking Spaces",
    params(("id" = i64, Path, description = "Parking space ID")),
    responses(
        (status = 200, description = "Parking space", body = ParkingSpace),
        (status = 404, description = "Parking space not found")
    )
)]
pub async fn get_space(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ParkingSpace>> {
    Ok(Json(state.parking_spaces.get_space(id).await?))
}

/// Get parking space by its space number
#[utoipa::path(
    get,
    path = "/api/parking-spaces/space-number/{space_number}",
    tag = "Parking Spaces",
    params(("space_number" = String, Path, description = "Space number")),
    responses(
        (status = 200, description = "Parking space", body = ParkingSpace),
        (status = 404, description = "Parking space not found")
    )
)]
pub async fn get_by_space_number(
    State(state): State<AppState>,
    Path(space_number): Path<String>,
) -> ApiResult<Json<ParkingSpace>> {
    Ok(Json(
        state.parking_spaces.get_by_space_number(&space_number).await?,
    ))
}

/// List AVAILABLE parking spaces
#[utoipa::path(
    get,
    path = "/api/parking-spaces/available",
    tag = "Parking Spaces",
    responses(
        (status = 200, description = "Available parking spaces", body = Vec<ParkingSpace>)
    )
)]
pub async fn list_available(State(state): State<AppState>) -> ApiResult<Json<Vec<ParkingSpace>>> {
    Ok(Json(state.parking_spaces.list_available().await?))
}

/// List AVAILABLE parking spaces in a city and zone
#[utoipa::path(
    get,
    path = "/api/parking-spaces/available/city/{city}/zone/{zone}",
    tag = "Parking Spaces",
    params(
        ("city" = String, Path, description = "City"),
        ("zone" = String, Path, description = "Zone")
    ),
    responses(
        (status = 200, description = "Available parking spaces", body = Vec<ParkingSpace>)
    )
)]
pub async fn list_available_in_city_zone(
    State(state): State<AppState>,
    Path((city, zone)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ParkingSpace>>> {
    Ok(Json(state.parking_spaces.list_available_in(&city, &zone).await?))
}

/// List parking spaces in a city
#[utoipa::path(
    get,
    path = "/api/parking-spaces/city/{city}",
    tag = "Parking Spaces",
    params(("city" = String, Path, description = "City")),
    responses(
        (status = 200, description = "Parking spaces in the city", body = Vec<ParkingSpace>)
    )
)]
pub async fn list_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> ApiResult<Json<Vec<ParkingSpace>>> {
    Ok(Json(state.parking_spaces.list_by_city(&city).await?))
}

/// List parking spaces in a zone
#[utoipa::path(
    get,
    path = "/api/parking-spaces/zone/{zone}",
    tag = "Parking Spaces",
    params(("zone" = String, Path, description = "Zone")),
    responses(
        (status = 200, description = "Parking spaces in the zone", body = Vec<ParkingSpace>)
    )
)]
pub async fn list_by_zone(
    State(state): State<AppState>,
    Path(zone): Path<String>,
) -> ApiResult<Json<Vec<ParkingSpace>>> {
    Ok(Json(state.parking_spaces.list_by_zone(&zone).await?))
}

/// List parking spaces of an owner
#[utoipa::path(
    get,
    path = "/api/parking-spaces/owner/{owner_id}",
    tag = "Parking Spaces",
    params(("owner_id" = i64, Path, description = "Owner user ID")),
    responses(
        (status = 200, description = "Parking spaces of the owner", body = Vec<ParkingSpace>)
    )
)]
pub async fn list_by_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> ApiResult<Json<Vec<ParkingSpace>>> {
    Ok(Json(state.parking_spaces.list_by_owner(owner_id).await?))
}

/// Create a parking space
#[utoipa::path(
    post,
    path = "/api/parking-spaces",
    tag = "Parking Spaces",
    request_body = CreateParkingSpaceRequest,
    responses(
        (status = 201, description = "Parking space created", body = ParkingSpace),
        (status = 400, description = "Invalid input or space number already exists")
    )
)]
pub async fn create_space(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateParkingSpaceRequest>,
) -> ApiResult<(StatusCode, Json<ParkingSpace>)> {
    let space = state
        .parking_spaces
        .create_space(req.into())
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok((StatusCode::CREATED, Json(space)))
}

/// Replace a parking space's details
#[utoipa::path(
    put,
    path = "/api/parking-spaces/{id}",
    tag = "Parking Spaces",
    params(("id" = i64, Path, description = "Parking space ID")),
    request_body = UpdateParkingSpaceRequest,
    responses(
        (status = 200, description = "Parking space updated", body = ParkingSpace),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Parking space not found")
    )
)]
pub async fn update_space(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateParkingSpaceRequest>,
) -> ApiResult<Json<ParkingSpace>> {
    let space = state
        .parking_spaces
        .update_space(id, req.into())
        .await
        .map_err(respond_with(StatusCode::NOT_FOUND))?;

    Ok(Json(space))
}

/// Reserve an AVAILABLE parking space
#[utoipa::path(
    put,
    path = "/api/parking-spaces/{id}/reserve",
    tag = "Parking Spaces",
    params(("id" = i64, Path, description = "Parking space ID")),
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "Parking space reserved", body = ParkingSpace),
        (status = 400, description = "Space missing or not available")
    )
)]
pub async fn reserve_space(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ReserveRequest>,
) -> ApiResult<Json<ParkingSpace>> {
    let hours = req.duration_hours.unwrap_or(DEFAULT_RESERVATION_HOURS);
    let space = state
        .parking_spaces
        .reserve(id, hours)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(space))
}

/// Release a parking space
#[utoipa::path(
    put,
    path = "/api/parking-spaces/{id}/release",
    tag = "Parking Spaces",
    params(("id" = i64, Path, description = "Parking space ID")),
    responses(
        (status = 200, description = "Parking space released", body = ParkingSpace),
        (status = 404, description = "Parking space not found")
    )
)]
pub async fn release_space(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ParkingSpace>> {
    let space = state
        .parking_spaces
        .release(id)
        .await
        .map_err(respond_with(StatusCode::NOT_FOUND))?;

    Ok(Json(space))
}

/// Mark a parking space OCCUPIED
#[utoipa::path(
    put,
    path = "/api/parking-spaces/{id}/occupy",
    tag = "Parking Spaces",
    params(("id" = i64, Path, description = "Parking space ID")),
    responses(
        (status = 200, description = "Parking space occupied", body = ParkingSpace),
        (status = 400, description = "Space missing or already occupied")
    )
)]
pub async fn occupy_space(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ParkingSpace>> {
    let space = state
        .parking_spaces
        .occupy(id)
        .await
        .map_err(respond_with(StatusCode::BAD_REQUEST))?;

    Ok(Json(space))
}

/// Delete a parking space
#[utoipa::path(
    delete,
    path = "/api/parking-spaces/{id}",
    tag = "Parking Spaces",
    params(("id" = i64, Path, description = "Parking space ID")),
    responses(
        (status = 204, description = "Parking space deleted"),
        (status = 404, description = "Parking space not found")
    )
)]
pub async fn delete_space(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .parking_spaces
        .delete_space(id)
        .await
        .map_err(respond_with(StatusCode::NOT_FOUND))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Count AVAILABLE spaces in a city
#[utoipa::path(
    get,
    path = "/api/parking-spaces/stats/available-count/city/{city}",
    tag = "Parking Spaces",
    params(("city" = String, Path, description = "City")),
    responses(
        (status = 200, description = "Available space count", body = AvailableCountResponse)
    )
)]
pub async fn available_count(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> ApiResult<Json<AvailableCountResponse>> {
    let available_spaces = state.parking_spaces.available_count(&city).await?;
    Ok(Json(AvailableCountResponse { available_spaces }))
}
