use sea_orm_migration::sea_orm::ConnectionTrait;
use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000002_create_cars::Cars;
use super::m20260301_000003_create_drivers::Drivers;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// At most one row may be `active`. Partial indexes are understood by both
/// Postgres and SQLite, so the statement is issued verbatim.
const SINGLE_ACTIVE_TRIP_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_trips_single_active ON trips (status) WHERE status = 'active'";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(uuid(Trips::Id).primary_key())
                    .col(uuid(Trips::CarId))
                    .col(uuid(Trips::DriverId))
                    .col(double(Trips::StartKm))
                    .col(double_null(Trips::EndKm))
                    .col(string(Trips::Origin))
                    .col(string_null(Trips::Destination))
                    .col(text_null(Trips::Observations))
                    .col(string_null(Trips::StartOdometerPhoto))
                    .col(string_null(Trips::EndOdometerPhoto))
                    .col(string_len(Trips::Status, 16))
                    .col(timestamp_with_time_zone(Trips::StartTime))
                    .col(timestamp_with_time_zone_null(Trips::EndTime))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_car")
                            .from(Trips::Table, Trips::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_driver")
                            .from(Trips::Table, Trips::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(SINGLE_ACTIVE_TRIP_INDEX)
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_trips_end_time")
                    .table(Trips::Table)
                    .col(Trips::EndTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Trips {
    Table,
    Id,
    CarId,
    DriverId,
    StartKm,
    EndKm,
    Origin,
    Destination,
    Observations,
    StartOdometerPhoto,
    EndOdometerPhoto,
    Status,
    StartTime,
    EndTime,
}
