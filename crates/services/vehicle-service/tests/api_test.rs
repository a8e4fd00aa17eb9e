//! Integration tests for the vehicle API.
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
use domain::{NewVehicle, Vehicle, VehicleType, VehicleUpdate};
use vehicle_service_lib::routes::create_router;
use vehicle_service_lib::service::VehicleService;
use vehicle_service_lib::state::AppState;

// =============================================================================
// Fake service
// =============================================================================

/// Vehicle 1 is an unparked car, vehicle 2 a truck parked in space 5,
/// anything else is missing.
struct FakeVehicleService;

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn fixture(id: i64) -> AppResult<Vehicle> {
    let (license_plate, vehicle_type, space) = match id {
        1 => ("XYZ-1", VehicleType::Car, None),
        2 => ("TRK-2", VehicleType::Truck, Some(5)),
        _ => return Err(AppError::not_found(format!("Vehicle with id {}", id))),
    };

    Ok(Vehicle {
        id,
        license_plate: license_plate.to_string(),
        user_id: 7,
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: Some(2020),
        color: None,
        vehicle_type,
        current_parking_space_id: space,
        entry_time: space.map(|_| now()),
        exit_time: None,
        created_at: now(),
        updated_at: now(),
    })
}

fn all() -> AppResult<Vec<Vehicle>> {
    Ok(vec![fixture(1)?, fixture(2)?])
}

#[async_trait]
impl VehicleService for FakeVehicleService {
    async fn get_vehicle(&self, id: i64) -> AppResult<Vehicle> {
        fixture(id)
    }

    async fn get_by_license_plate(&self, license_plate: &str) -> AppResult<Vehicle> {
        all()?
            .into_iter()
            .find(|v| v.license_plate == license_plate)
            .ok_or_else(|| AppError::not_found(format!("Vehicle '{}'", license_plate)))
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        all()
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        Ok(all()?.into_iter().filter(|v| v.user_id == user_id).collect())
    }

    async fn list_by_type(&self, vehicle_type: VehicleType) -> AppResult<Vec<Vehicle>> {
        Ok(all()?
            .into_iter()
            .filter(|v| v.vehicle_type == vehicle_type)
            .collect())
    }

    async fn list_by_make(&self, make: &str) -> AppResult<Vec<Vehicle>> {
        Ok(all()?.into_iter().filter(|v| v.make == make).collect())
    }

    async fn list_by_make_and_model(&self, make: &str, model: &str) -> AppResult<Vec<Vehicle>> {
        Ok(all()?
            .into_iter()
            .filter(|v| v.make == make && v.model == model)
            .collect())
    }

    async fn list_parked(&self) -> AppResult<Vec<Vehicle>> {
        Ok(all()?.into_iter().filter(Vehicle::is_parked).collect())
    }

    async fn list_parked_by_user(&self, user_id: i64) -> AppResult<Vec<Vehicle>> {
        let parked = self.list_parked().await?;
        Ok(parked.into_iter().filter(|v| v.user_id == user_id).collect())
    }

    async fn create_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        if vehicle.license_plate == "XYZ-1" {
            return Err(AppError::conflict("Vehicle with license plate 'XYZ-1'"));
        }
        let mut created = fixture(1)?;
        created.id = 10;
        created.license_plate = vehicle.license_plate;
        created.vehicle_type = vehicle.vehicle_type;
        Ok(created)
    }

    async fn update_vehicle(&self, id: i64, update: VehicleUpdate) -> AppResult<Vehicle> {
        let vehicle = fixture(id)?;
        if update.changes_plate(&vehicle) && update.license_plate == "TRK-2" {
            return Err(AppError::conflict("Vehicle with license plate 'TRK-2'"));
        }
        Ok(vehicle.apply(update, now()))
    }

    async fn record_entry(&self, id: i64, parking_space_id: i64) -> AppResult<Vehicle> {
        Ok(fixture(id)?.enter(parking_space_id, now())?)
    }

    async fn record_exit(&self, id: i64) -> AppResult<Vehicle> {
        Ok(fixture(id)?.exit(now())?)
    }

    async fn delete_vehicle(&self, id: i64) -> AppResult<()> {
        Ok(fixture(id)?.ensure_deletable()?)
    }

    async fn parked_count(&self) -> AppResult<u64> {
        Ok(1)
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app() -> Router {
    create_router(AppState::new(Arc::new(FakeVehicleService), None))
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

fn vehicle_body(license_plate: &str) -> Value {
    json!({
        "licensePlate": license_plate,
        "userId": 7,
        "make": "Toyota",
        "model": "Corolla",
        "vehicleType": "SUV"
    })
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_get_vehicle_by_id_and_plate() {
    let (status, body) = send("GET", "/api/vehicles/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["licensePlate"], "TRK-2");
    assert_eq!(body["vehicleType"], "TRUCK");
    assert_eq!(body["currentParkingSpaceId"], 5);

    let (status, body) = send("GET", "/api/vehicles/license-plate/XYZ-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let (status, body) = send("GET", "/api/vehicles/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_filtered_lists() {
    let (status, body) = send("GET", "/api/vehicles/type/TRUCK", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (_, body) = send("GET", "/api/vehicles/make/Toyota/model/Corolla", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = send("GET", "/api/vehicles/make/Honda", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let (_, body) = send("GET", "/api/vehicles/parked/user/7", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unknown_vehicle_type_is_400() {
    let (status, _) = send("GET", "/api/vehicles/type/BOAT", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_parked_count_body() {
    let (status, body) = send("GET", "/api/vehicles/stats/parked-count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "parkedVehicles": 1 }));
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_create_vehicle_returns_201() {
    let (status, body) = send("POST", "/api/vehicles", Some(vehicle_body("NEW-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["licensePlate"], "NEW-1");
    assert_eq!(body["vehicleType"], "SUV");
    assert!(body["currentParkingSpaceId"].is_null());
}

#[tokio::test]
async fn test_create_failures_are_400() {
    let (status, body) = send("POST", "/api/vehicles", Some(vehicle_body("XYZ-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send("POST", "/api/vehicles", Some(vehicle_body(""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_statuses() {
    let (status, body) = send("PUT", "/api/vehicles/1", Some(vehicle_body("XYZ-9"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["licensePlate"], "XYZ-9");

    let (status, _) = send("PUT", "/api/vehicles/99", Some(vehicle_body("XYZ-9"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send("PUT", "/api/vehicles/1", Some(vehicle_body("TRK-2"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_entry_parks_vehicle() {
    let (status, body) = send(
        "PUT",
        "/api/vehicles/1/entry",
        Some(json!({ "parkingSpaceId": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentParkingSpaceId"], 5);
    assert!(body["entryTime"].is_string());
    assert!(body["exitTime"].is_null());
}

#[tokio::test]
async fn test_entry_failures_are_400() {
    // Already parked
    let (status, body) = send(
        "PUT",
        "/api/vehicles/2/entry",
        Some(json!({ "parkingSpaceId": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATE");

    // Missing space id
    let (status, _) = send("PUT", "/api/vehicles/1/entry", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown vehicle
    let (status, _) = send(
        "PUT",
        "/api/vehicles/99/entry",
        Some(json!({ "parkingSpaceId": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exit_statuses() {
    let (status, body) = send("PUT", "/api/vehicles/2/exit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["currentParkingSpaceId"].is_null());
    assert!(body["entryTime"].is_string());
    assert!(body["exitTime"].is_string());

    let (status, _) = send("PUT", "/api/vehicles/1/exit", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_statuses() {
    let (status, _) = send("DELETE", "/api/vehicles/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Parked vehicle and unknown vehicle both report 400
    let (status, body) = send("DELETE", "/api/vehicles/2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATE");

    let (status, _) = send("DELETE", "/api/vehicles/99", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_without_database_is_healthy() {
    let (status, body) = send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "vehicle-service");
}
