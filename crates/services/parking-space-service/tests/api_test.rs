//! Integration tests for the parking space API.
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
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{AppError, AppResult};
use domain::{NewParkingSpace, ParkingSpace, ParkingSpaceUpdate, ParkingStatus};
use parking_space_service_lib::routes::create_router;
use parking_space_service_lib::service::ParkingSpaceService;
use parking_space_service_lib::state::AppState;

// =============================================================================
// Fake service
// =============================================================================

/// Space 1 is AVAILABLE, space 2 is OCCUPIED, anything else is missing.
struct FakeParkingSpaceService;

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn fixture(id: i64) -> AppResult<ParkingSpace> {
    let status = match id {
        1 => ParkingStatus::Available,
        2 => ParkingStatus::Occupied,
        _ => return Err(AppError::not_found(format!("Parking space with id {}", id))),
    };

    Ok(ParkingSpace {
        id,
        space_number: format!("A{}", id),
        location: "Level 1".to_string(),
        city: "Colombo".to_string(),
        zone: Some("North".to_string()),
        hourly_rate: Decimal::new(200, 2),
        owner_id: Some(7),
        status,
        reserved_until: None,
        created_at: now(),
        updated_at: now(),
    })
}

#[async_trait]
impl ParkingSpaceService for FakeParkingSpaceService {
    async fn get_space(&self, id: i64) -> AppResult<ParkingSpace> {
        fixture(id)
    }

    async fn get_by_space_number(&self, space_number: &str) -> AppResult<ParkingSpace> {
        match space_number {
            "A1" => fixture(1),
            _ => Err(AppError::not_found(format!("Parking space '{}'", space_number))),
        }
    }

    async fn list_spaces(&self) -> AppResult<Vec<ParkingSpace>> {
        Ok(vec![fixture(1)?, fixture(2)?])
    }

    async fn list_available(&self) -> AppResult<Vec<ParkingSpace>> {
        Ok(vec![fixture(1)?])
    }

    async fn list_by_city(&self, _city: &str) -> AppResult<Vec<ParkingSpace>> {
        self.list_spaces().await
    }

    async fn list_by_zone(&self, _zone: &str) -> AppResult<Vec<ParkingSpace>> {
        self.list_spaces().await
    }

    async fn list_by_owner(&self, _owner_id: i64) -> AppResult<Vec<ParkingSpace>> {
        self.list_spaces().await
    }

    async fn list_available_in(&self, city: &str, zone: &str) -> AppResult<Vec<ParkingSpace>> {
        if city == "Colombo" && zone == "North" {
            self.list_available().await
        } else {
            Ok(vec![])
        }
    }

    async fn available_count(&self, _city: &str) -> AppResult<u64> {
        Ok(3)
    }

    async fn create_space(&self, space: NewParkingSpace) -> AppResult<ParkingSpace> {
        if space.space_number == "TAKEN" {
            return Err(AppError::conflict("Parking space with number 'TAKEN'"));
        }
        let mut created = fixture(1)?;
        created.id = 10;
        created.status = space.initial_status();
        created.space_number = space.space_number;
        Ok(created)
    }

    async fn update_space(&self, id: i64, update: ParkingSpaceUpdate) -> AppResult<ParkingSpace> {
        Ok(fixture(id)?.apply(update, now()))
    }

    async fn reserve(&self, id: i64, duration_hours: i64) -> AppResult<ParkingSpace> {
        Ok(fixture(id)?.reserve(duration_hours, now())?)
    }

    async fn release(&self, id: i64) -> AppResult<ParkingSpace> {
        Ok(fixture(id)?.release(now()))
    }

    async fn occupy(&self, id: i64) -> AppResult<ParkingSpace> {
        Ok(fixture(id)?.occupy(now())?)
    }

    async fn delete_space(&self, id: i64) -> AppResult<()> {
        fixture(id).map(|_| ())
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app() -> Router {
    create_router(AppState::new(Arc::new(FakeParkingSpaceService), None))
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

fn create_body(space_number: &str) -> Value {
    json!({
        "spaceNumber": space_number,
        "location": "Level 2",
        "city": "Colombo",
        "hourlyRate": 2.5
    })
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_get_space_returns_camel_case_body() {
    let (status, body) = send("GET", "/api/parking-spaces/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spaceNumber"], "A1");
    assert_eq!(body["status"], "AVAILABLE");
}

#[tokio::test]
async fn test_get_missing_space_is_404() {
    let (status, body) = send("GET", "/api/parking-spaces/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_space_number_lookup() {
    let (status, _) = send("GET", "/api/parking-spaces/space-number/A1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send("GET", "/api/parking-spaces/space-number/Z9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_available_routes_do_not_collide_with_id() {
    let (status, body) = send("GET", "/api/parking-spaces/available", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        "GET",
        "/api/parking-spaces/available/city/Colombo/zone/South",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_available_count_stat() {
    let (status, body) = send(
        "GET",
        "/api/parking-spaces/stats/available-count/city/Colombo",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "availableSpaces": 3 }));
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_create_space_returns_201() {
    let (status, body) = send("POST", "/api/parking-spaces", Some(create_body("B7"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["spaceNumber"], "B7");
    assert_eq!(body["status"], "AVAILABLE");
}

#[tokio::test]
async fn test_create_duplicate_space_is_400() {
    let (status, body) = send("POST", "/api/parking-spaces", Some(create_body("TAKEN"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_rejects_invalid_payloads() {
    let mut negative = create_body("B8");
    negative["hourlyRate"] = json!(-1);
    let (status, _) = send("POST", "/api/parking-spaces", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        "POST",
        "/api/parking-spaces",
        Some(json!({ "spaceNumber": "B9" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_unstorable_rates() {
    for rate in ["0.005", "10000.01"] {
        let mut body = create_body("B10");
        body["hourlyRate"] = json!(rate);
        let (status, body) = send("POST", "/api/parking-spaces", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rate {rate}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_reserve_available_space() {
    let (status, body) = send(
        "PUT",
        "/api/parking-spaces/1/reserve",
        Some(json!({ "durationHours": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RESERVED");
    assert!(body["reservedUntil"].is_string());
}

#[tokio::test]
async fn test_reserve_defaults_to_one_hour() {
    let (status, body) = send("PUT", "/api/parking-spaces/1/reserve", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RESERVED");
}

#[tokio::test]
async fn test_reserve_failures_are_400() {
    // Occupied
    let (status, _) = send(
        "PUT",
        "/api/parking-spaces/2/reserve",
        Some(json!({ "durationHours": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing space
    let (status, _) = send(
        "PUT",
        "/api/parking-spaces/99/reserve",
        Some(json!({ "durationHours": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        "PUT",
        "/api/parking-spaces/1/reserve",
        Some(json!({ "durationHours": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reserve_rejects_oversized_duration() {
    for hours in [8761_i64, 3_000_000_000, i64::MAX] {
        let (status, body) = send(
            "PUT",
            "/api/parking-spaces/1/reserve",
            Some(json!({ "durationHours": hours })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "hours {hours}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_release_missing_space_is_404() {
    let (status, _) = send("PUT", "/api/parking-spaces/99/release", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send("PUT", "/api/parking-spaces/2/release", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "AVAILABLE");
}

#[tokio::test]
async fn test_occupy_occupied_space_is_400() {
    let (status, body) = send("PUT", "/api/parking-spaces/2/occupy", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_update_missing_space_is_404() {
    let body = json!({
        "location": "Level 3",
        "city": "Galle",
        "hourlyRate": "4.00",
        "status": "AVAILABLE"
    });
    let (status, _) = send("PUT", "/api/parking-spaces/99", Some(body.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send("PUT", "/api/parking-spaces/1", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Galle");
}

#[tokio::test]
async fn test_delete_space() {
    let (status, _) = send("DELETE", "/api/parking-spaces/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send("DELETE", "/api/parking-spaces/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_without_database_is_healthy() {
    let (status, body) = send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "parking-space-service");
}
