//! Vehicle database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Vehicle, VehicleType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub license_plate: String,
    pub user_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vehicle_type: String,
    pub current_parking_space_id: Option<i64>,
    pub entry_time: Option<DateTimeUtc>,
    pub exit_time: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Vehicle {
    fn from(model: Model) -> Self {
        Vehicle {
            id: model.id,
            license_plate: model.license_plate,
            user_id: model.user_id,
            make: model.make,
            model: model.model,
            year: model.year,
            color: model.color,
            vehicle_type: VehicleType::from(model.vehicle_type.as_str()),
            current_parking_space_id: model.current_parking_space_id,
            entry_time: model.entry_time,
            exit_time: model.exit_time,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
