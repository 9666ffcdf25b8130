use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(uuid(Drivers::Id).primary_key())
                    .col(string(Drivers::Name))
                    .col(string_len(Drivers::License, 32))
                    .col(string_null(Drivers::Contact))
                    .col(
                        timestamp_with_time_zone(Drivers::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Drivers {
    Table,
    Id,
    Name,
    License,
    Contact,
    CreatedAt,
}
