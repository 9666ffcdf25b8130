use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleet_ledger::{
    config::Config,
    db,
    handlers::auth::seed_admin,
    middleware::rate_limit::{create_global_governor, log_request},
    routes,
    services::{blob::LocalBlobStore, location::NominatimGeocoder},
    sync::{run_subscriber, Backoff, LedgerCache, SyncNotifier},
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Invalid configuration");
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    let geocoder = NominatimGeocoder::new(config.geocoder_url.clone(), config.location_timeout)
        .expect("Failed to create geocoder");

    let notifier = SyncNotifier::default();
    let cache = Arc::new(LedgerCache::new(db.clone()));

    let state = AppState {
        db,
        config: config.clone(),
        notifier: notifier.clone(),
        cache: cache.clone(),
        blobs: Arc::new(LocalBlobStore::new(
            config.upload_dir.clone(),
            config.upload_public_url.clone(),
        )),
        geocoder: Arc::new(geocoder),
    };

    // Seed admin account if not exists
    seed_admin(&state).await.expect("Failed to seed admin account");

    // Keep the in-process ledger cache in step with every mutation
    tokio::spawn(run_subscriber(notifier.subscribe(), cache, Backoff::default()));

    let mut app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    match create_global_governor() {
        Some(governor) => app = app.layer(governor),
        None => tracing::warn!("Rate limiter misconfigured, running without it"),
    }
    let app = app.layer(middleware::from_fn(log_request));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
