pub mod auth;
pub mod events;
pub mod fleet;
pub mod fuel;
pub mod reports;
pub mod service_orders;
pub mod trips;
