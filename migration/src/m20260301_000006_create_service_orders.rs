use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOrders::Table)
                    .if_not_exists()
                    .col(uuid(ServiceOrders::Id).primary_key())
                    .col(string(ServiceOrders::RequestingCompany))
                    .col(string(ServiceOrders::ClientName))
                    .col(text(ServiceOrders::Description))
                    .col(string_null(ServiceOrders::ContactInfo))
                    .col(string_null(ServiceOrders::PhotoUrl))
                    .col(string_len(ServiceOrders::Status, 16))
                    .col(
                        timestamp_with_time_zone(ServiceOrders::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ServiceOrders {
    Table,
    Id,
    RequestingCompany,
    ClientName,
    Description,
    ContactInfo,
    PhotoUrl,
    Status,
    CreatedAt,
}
