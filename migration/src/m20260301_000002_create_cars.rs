use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(uuid(Cars::Id).primary_key())
                    .col(string(Cars::Model))
                    .col(string_len(Cars::Plate, 16).unique_key())
                    .col(integer_null(Cars::Year))
                    .col(
                        timestamp_with_time_zone(Cars::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Cars {
    Table,
    Id,
    Model,
    Plate,
    Year,
    CreatedAt,
}
