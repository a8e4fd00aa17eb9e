//! Migration: Create parking_spaces table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSpaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSpaces::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpaces::SpaceNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ParkingSpaces::Location).string().not_null())
                    .col(ColumnDef::new(ParkingSpaces::City).string().not_null())
                    .col(ColumnDef::new(ParkingSpaces::Zone).string().null())
                    .col(
                        ColumnDef::new(ParkingSpaces::HourlyRate)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSpaces::OwnerId).big_integer().null())
                    .col(
                        ColumnDef::new(ParkingSpaces::Status)
                            .string_len(16)
                            .not_null()
                            .default("AVAILABLE"),
                    )
                    .col(
                        ColumnDef::new(ParkingSpaces::ReservedUntil)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpaces::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParkingSpaces::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_parking_spaces_city_status")
                    .table(ParkingSpaces::Table)
                    .col(ParkingSpaces::City)
                    .col(ParkingSpaces::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSpaces::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ParkingSpaces {
    Table,
    Id,
    SpaceNumber,
    Location,
    City,
    Zone,
    HourlyRate,
    OwnerId,
    Status,
    ReservedUntil,
    CreatedAt,
    UpdatedAt,
}
