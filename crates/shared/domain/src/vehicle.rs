//! Vehicle entity and its parking presence.
//!
//! A vehicle is parked exactly when `current_parking_space_id` is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Vehicle body type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    #[default]
    Car,
    Motorcycle,
    Truck,
    Van,
    Suv,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "CAR",
            VehicleType::Motorcycle => "MOTORCYCLE",
            VehicleType::Truck => "TRUCK",
            VehicleType::Van => "VAN",
            VehicleType::Suv => "SUV",
        }
    }
}

impl From<&str> for VehicleType {
    fn from(s: &str) -> Self {
        match s {
            "MOTORCYCLE" => VehicleType::Motorcycle,
            "TRUCK" => VehicleType::Truck,
            "VAN" => VehicleType::Van,
            "SUV" => VehicleType::Suv,
            _ => VehicleType::Car,
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub license_plate: String,
    pub user_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_type: VehicleType,
    pub current_parking_space_id: Option<i64>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_parked(&self) -> bool {
        self.current_parking_space_id.is_some()
    }

    /// Park in `parking_space_id`.
    ///
    /// # Errors
    /// `InvalidState` if the vehicle is already parked.
    pub fn enter(self, parking_space_id: i64, now: DateTime<Utc>) -> DomainResult<Self> {
        if self.is_parked() {
            return Err(DomainError::invalid_state("Vehicle is already parked"));
        }

        Ok(Self {
            current_parking_space_id: Some(parking_space_id),
            entry_time: Some(now),
            exit_time: None,
            updated_at: now,
            ..self
        })
    }

    /// Leave the current space; `entry_time` is kept as history.
    ///
    /// # Errors
    /// `InvalidState` if the vehicle is not parked.
    pub fn exit(self, now: DateTime<Utc>) -> DomainResult<Self> {
        if !self.is_parked() {
            return Err(DomainError::invalid_state("Vehicle is not currently parked"));
        }

        Ok(Self {
            current_parking_space_id: None,
            exit_time: Some(now),
            updated_at: now,
            ..self
        })
    }

    /// A parked vehicle cannot be deleted
    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.is_parked() {
            return Err(DomainError::invalid_state(
                "Cannot delete vehicle that is currently parked. Please exit the vehicle first.",
            ));
        }
        Ok(())
    }

    /// Replace the descriptive fields. Parking presence is untouched.
    pub fn apply(self, update: VehicleUpdate, now: DateTime<Utc>) -> Self {
        Self {
            license_plate: update.license_plate,
            make: update.make,
            model: update.model,
            year: update.year,
            color: update.color,
            vehicle_type: update.vehicle_type,
            updated_at: now,
            ..self
        }
    }
}

/// Vehicle registration data
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub license_plate: String,
    pub user_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_type: VehicleType,
}

/// Full descriptive replacement
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleUpdate {
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_type: VehicleType,
}

impl VehicleUpdate {
    pub fn changes_plate(&self, current: &Vehicle) -> bool {
        self.license_plate != current.license_plate
    }
}
