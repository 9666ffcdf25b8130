pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_cars;
mod m20260301_000003_create_drivers;
mod m20260301_000004_create_trips;
mod m20260301_000005_create_fuel_records;
mod m20260301_000006_create_service_orders;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_cars::Migration),
            Box::new(m20260301_000003_create_drivers::Migration),
            Box::new(m20260301_000004_create_trips::Migration),
            Box::new(m20260301_000005_create_fuel_records::Migration),
            Box::new(m20260301_000006_create_service_orders::Migration),
        ]
    }
}
