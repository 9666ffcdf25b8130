pub mod car;
pub mod driver;
pub mod fuel_record;
pub mod service_order;
pub mod trip;
pub mod user;
