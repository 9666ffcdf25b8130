pub mod attachment;
pub mod jwt;
