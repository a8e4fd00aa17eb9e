//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_parking_spaces_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(
            m20250601_000001_create_parking_spaces_table::Migration,
        )]
    }

    // Own bookkeeping table so every service can share one database
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_parking_space").into_iden()
    }
}
