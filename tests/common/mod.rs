#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use fleet_ledger::config::Config;
use fleet_ledger::entities::user::UserRole;
use fleet_ledger::services::blob::LocalBlobStore;
use fleet_ledger::services::location::{Coordinates, ReverseGeocoder};
use fleet_ledger::store::{self, cars::NewCar, drivers::NewDriver};
use fleet_ledger::sync::{LedgerCache, SyncNotifier};
use fleet_ledger::utils::jwt::create_token;
use fleet_ledger::{AppResult, AppState};

pub const JWT_SECRET: &str = "test-secret";
pub const PLACE: &str = "Avenida Paulista, Bela Vista, São Paulo";

/// A single-connection in-memory SQLite database with every migration applied.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

/// A pooled SQLite database on disk, so several connections really run at once.
pub async fn setup_shared_db(dir: &Path, max_connections: u32) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.join("ledger.db").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .min_connections(max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 1,
        elevation_minutes: 5,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_username: "admin".to_string(),
        admin_password: "admin-password".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        upload_public_url: "/uploads".to_string(),
        geocoder_url: "http://127.0.0.1:9/reverse".to_string(),
        location_timeout: Duration::from_millis(200),
        report_offset: FixedOffset::east_opt(0).unwrap(),
        sse_retry: Duration::from_secs(3),
    }
}

pub struct FixedGeocoder;

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn reverse(&self, _coords: Coordinates) -> AppResult<Option<String>> {
        Ok(Some(PLACE.to_string()))
    }
}

pub async fn test_state(upload_dir: &Path) -> AppState {
    let db = setup_db().await;
    let config = test_config(upload_dir);

    AppState {
        cache: Arc::new(LedgerCache::new(db.clone())),
        blobs: Arc::new(LocalBlobStore::new(upload_dir, config.upload_public_url.clone())),
        geocoder: Arc::new(FixedGeocoder),
        notifier: SyncNotifier::default(),
        db,
        config,
    }
}

pub fn token(role: UserRole) -> String {
    let username = match role {
        UserRole::Admin => "admin",
        UserRole::User => "joao",
    };
    create_token(
        Uuid::new_v4(),
        username,
        role,
        false,
        JWT_SECRET,
        chrono::Duration::hours(1),
    )
    .unwrap()
}

/// The car and driver every scenario starts from.
pub async fn seed_fleet(db: &DatabaseConnection) -> (Uuid, Uuid) {
    let car = store::cars::create(
        db,
        NewCar {
            model: "Toyota Corolla".to_string(),
            plate: "ABC-1234".to_string(),
            year: Some(2020),
        },
    )
    .await
    .unwrap();

    let driver = store::drivers::create(
        db,
        NewDriver {
            name: "João Silva".to_string(),
            license: "12345678900".to_string(),
            contact: Some("(11) 98888-7777".to_string()),
        },
    )
    .await
    .unwrap();

    (car.id, driver.id)
}
