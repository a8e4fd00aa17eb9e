//! Parking space entity and its reservation state machine.
//!
//! AVAILABLE -> RESERVED -> OCCUPIED -> AVAILABLE, with AVAILABLE -> OCCUPIED
//! permitted directly. `release` returns any space to AVAILABLE.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_BOOKING_HOURS;
use crate::error::{DomainError, DomainResult};

const AVAILABLE: &str = "AVAILABLE";
const RESERVED: &str = "RESERVED";
const OCCUPIED: &str = "OCCUPIED";

/// Occupancy status of a parking space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParkingStatus {
    #[default]
    Available,
    Reserved,
    Occupied,
}

impl ParkingStatus {
    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ParkingStatus::Available => AVAILABLE,
            ParkingStatus::Reserved => RESERVED,
            ParkingStatus::Occupied => OCCUPIED,
        }
    }
}

impl From<&str> for ParkingStatus {
    fn from(s: &str) -> Self {
        match s {
            RESERVED => ParkingStatus::Reserved,
            OCCUPIED => ParkingStatus::Occupied,
            _ => ParkingStatus::Available,
        }
    }
}

impl std::fmt::Display for ParkingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parking space snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpace {
    pub id: i64,
    pub space_number: String,
    pub location: String,
    pub city: String,
    pub zone: Option<String>,
    pub hourly_rate: Decimal,
    pub owner_id: Option<i64>,
    pub status: ParkingStatus,
    /// Set only while RESERVED; cleared by `release` and by updates away from RESERVED
    pub reserved_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingSpace {
    /// Check if the space can be reserved right now
    pub fn is_available(&self) -> bool {
        self.status == ParkingStatus::Available
    }

    /// Reserve the space for `duration_hours` starting at `now`.
    ///
    /// # Errors
    /// Returns `Validation` for a duration outside `1..=MAX_BOOKING_HOURS`
    /// and `InvalidState` unless the space is AVAILABLE.
    pub fn reserve(self, duration_hours: i64, now: DateTime<Utc>) -> DomainResult<Self> {
        if duration_hours <= 0 {
            return Err(DomainError::validation(
                "Reservation duration must be a positive number of hours",
            ));
        }
        if duration_hours > MAX_BOOKING_HOURS {
            return Err(DomainError::validation(format!(
                "Reservation duration cannot exceed {} hours",
                MAX_BOOKING_HOURS
            )));
        }
        if !self.is_available() {
            return Err(DomainError::invalid_state(
                "Parking space is not available for reservation",
            ));
        }

        let reserved_until = Duration::try_hours(duration_hours)
            .and_then(|span| now.checked_add_signed(span))
            .ok_or_else(|| DomainError::validation("Reservation end is out of range"))?;

        Ok(Self {
            status: ParkingStatus::Reserved,
            reserved_until: Some(reserved_until),
            updated_at: now,
            ..self
        })
    }

    /// Return the space to AVAILABLE regardless of its current status
    pub fn release(self, now: DateTime<Utc>) -> Self {
        Self {
            status: ParkingStatus::Available,
            reserved_until: None,
            updated_at: now,
            ..self
        }
    }

    /// Mark the space OCCUPIED. `reserved_until` is left as it was.
    pub fn occupy(self, now: DateTime<Utc>) -> DomainResult<Self> {
        if self.status == ParkingStatus::Occupied {
            return Err(DomainError::invalid_state("Parking space is already occupied"));
        }

        Ok(Self {
            status: ParkingStatus::Occupied,
            updated_at: now,
            ..self
        })
    }

    /// Replace the editable fields. The space number is not touched.
    pub fn apply(self, update: ParkingSpaceUpdate, now: DateTime<Utc>) -> Self {
        let reserved_until = if update.status == ParkingStatus::Reserved {
            self.reserved_until
        } else {
            None
        };

        Self {
            location: update.location,
            zone: update.zone,
            city: update.city,
            hourly_rate: update.hourly_rate,
            status: update.status,
            reserved_until,
            updated_at: now,
            ..self
        }
    }
}

/// Parking space creation data
#[derive(Debug, Clone, PartialEq)]
pub struct NewParkingSpace {
    pub space_number: String,
    pub location: String,
    pub city: String,
    pub zone: Option<String>,
    pub hourly_rate: Decimal,
    pub owner_id: Option<i64>,
    /// Defaults to AVAILABLE when omitted
    pub status: Option<ParkingStatus>,
}

impl NewParkingSpace {
    /// Status the row is inserted with
    pub fn initial_status(&self) -> ParkingStatus {
        self.status.unwrap_or_default()
    }
}

/// Full-field replacement applied by `update`
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpaceUpdate {
    pub location: String,
    pub city: String,
    pub zone: Option<String>,
    pub hourly_rate: Decimal,
    pub status: ParkingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(status: ParkingStatus) -> ParkingSpace {
        let created = Utc::now() - Duration::days(1);
        ParkingSpace {
            id: 1,
            space_number: "A1".to_string(),
            location: "Level 1".to_string(),
            city: "Colombo".to_string(),
            zone: Some("North".to_string()),
            hourly_rate: Decimal::new(200, 2),
            owner_id: Some(7),
            status,
            reserved_until: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_reserve_available_space() {
        let now = Utc::now();
        let reserved = space(ParkingStatus::Available).reserve(3, now).unwrap();

        assert_eq!(reserved.status, ParkingStatus::Reserved);
        assert_eq!(reserved.reserved_until, Some(now + Duration::hours(3)));
        assert_eq!(reserved.updated_at, now);
    }

    #[test]
    fn test_reserve_rejects_non_available_space() {
        for status in [ParkingStatus::Reserved, ParkingStatus::Occupied] {
            let result = space(status).reserve(1, Utc::now());
            assert!(matches!(result, Err(DomainError::InvalidState(_))));
        }
    }

    #[test]
    fn test_reserve_rejects_non_positive_duration() {
        let result = space(ParkingStatus::Available).reserve(0, Utc::now());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_reserve_rejects_duration_beyond_limit() {
        let now = Utc::now();
        for hours in [MAX_BOOKING_HOURS + 1, 3_000_000_000, i64::MAX] {
            let result = space(ParkingStatus::Available).reserve(hours, now);
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        let longest = space(ParkingStatus::Available)
            .reserve(MAX_BOOKING_HOURS, now)
            .unwrap();
        assert_eq!(
            longest.reserved_until,
            Some(now + Duration::hours(MAX_BOOKING_HOURS))
        );
    }

    #[test]
    fn test_release_from_any_status() {
        let now = Utc::now();
        for status in [
            ParkingStatus::Available,
            ParkingStatus::Reserved,
            ParkingStatus::Occupied,
        ] {
            let mut s = space(status);
            s.reserved_until = Some(now);
            let released = s.release(now);
            assert_eq!(released.status, ParkingStatus::Available);
            assert!(released.reserved_until.is_none());
        }
    }

    #[test]
    fn test_occupy_keeps_reservation_window() {
        let now = Utc::now();
        let reserved = space(ParkingStatus::Available).reserve(2, now).unwrap();
        let until = reserved.reserved_until;

        let occupied = reserved.occupy(now).unwrap();
        assert_eq!(occupied.status, ParkingStatus::Occupied);
        assert_eq!(occupied.reserved_until, until);
    }

    #[test]
    fn test_occupy_twice_fails() {
        let result = space(ParkingStatus::Occupied).occupy(Utc::now());
        assert!(matches!(result, Err(DomainError::InvalidState(_))));
    }

    #[test]
    fn test_apply_update_clears_reservation_when_leaving_reserved() {
        let now = Utc::now();
        let reserved = space(ParkingStatus::Available).reserve(2, now).unwrap();

        let updated = reserved.apply(
            ParkingSpaceUpdate {
                location: "Level 2".to_string(),
                city: "Kandy".to_string(),
                zone: None,
                hourly_rate: Decimal::new(350, 2),
                status: ParkingStatus::Available,
            },
            now,
        );

        assert_eq!(updated.space_number, "A1");
        assert_eq!(updated.city, "Kandy");
        assert_eq!(updated.status, ParkingStatus::Available);
        assert!(updated.reserved_until.is_none());
    }

    #[test]
    fn test_status_round_trips_through_storage_string() {
        assert_eq!(ParkingStatus::from("RESERVED"), ParkingStatus::Reserved);
        assert_eq!(ParkingStatus::Occupied.as_str(), "OCCUPIED");
        assert_eq!(
            serde_json::to_string(&ParkingStatus::Available).unwrap(),
            "\"AVAILABLE\""
        );
    }
}
