//! Payment database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Payment, PaymentMethod, PaymentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub parking_space_id: i64,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub hourly_rate: Decimal,
    pub parking_duration_hours: i64,
    pub parking_start_time: DateTimeUtc,
    pub parking_end_time: DateTimeUtc,
    pub payment_date: Option<DateTimeUtc>,
    pub payment_method: String,
    pub status: String,
    pub card_number_masked: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Payment {
            id: model.id,
            transaction_id: model.transaction_id,
            user_id: model.user_id,
            vehicle_id: model.vehicle_id,
            parking_space_id: model.parking_space_id,
            amount: model.amount,
            hourly_rate: model.hourly_rate,
            parking_duration_hours: model.parking_duration_hours,
            parking_start_time: model.parking_start_time,
            parking_end_time: model.parking_end_time,
            payment_date: model.payment_date,
            payment_method: PaymentMethod::from(model.payment_method.as_str()),
            status: PaymentStatus::from(model.status.as_str()),
            card_number_masked: model.card_number_masked,
            failure_reason: model.failure_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
