pub mod access;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;
pub mod sync;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::blob::BlobStore;
use services::location::ReverseGeocoder;
use sync::{LedgerCache, SyncNotifier};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub notifier: SyncNotifier,
    pub cache: Arc<LedgerCache>,
    pub blobs: Arc<dyn BlobStore>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
}
