pub mod blob;
pub mod location;
pub mod trip_lifecycle;
