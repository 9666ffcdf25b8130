use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000002_create_cars::Cars;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FuelRecords::Table)
                    .if_not_exists()
                    .col(uuid(FuelRecords::Id).primary_key())
                    .col(uuid(FuelRecords::CarId))
                    .col(double(FuelRecords::Liters))
                    .col(double(FuelRecords::Value))
                    .col(double(FuelRecords::Km))
                    .col(timestamp_with_time_zone(FuelRecords::Date))
                    .col(string_null(FuelRecords::ReceiptPhoto))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fuel_records_car")
                            .from(FuelRecords::Table, FuelRecords::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fuel_records_date")
                    .table(FuelRecords::Table)
                    .col(FuelRecords::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FuelRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum FuelRecords {
    Table,
    Id,
    CarId,
    Liters,
    Value,
    Km,
    Date,
    ReceiptPhoto,
}
