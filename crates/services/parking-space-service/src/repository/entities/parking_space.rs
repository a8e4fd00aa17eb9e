//! Parking space database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{ParkingSpace, ParkingStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "parking_spaces")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub space_number: String,
    pub location: String,
    pub city: String,
    pub zone: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub hourly_rate: Decimal,
    pub owner_id: Option<i64>,
    pub status: String,
    pub reserved_until: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for ParkingSpace {
    fn from(model: Model) -> Self {
        ParkingSpace {
            id: model.id,
            space_number: model.space_number,
            location: model.location,
            city: model.city,
            zone: model.zone,
            hourly_rate: model.hourly_rate,
            owner_id: model.owner_id,
            status: ParkingStatus::from(model.status.as_str()),
            reserved_until: model.reserved_until,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
