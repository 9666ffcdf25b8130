use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers::{auth, events, fleet, fuel, reports, service_orders, trips};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/elevate", post(auth::elevate));

    // Any signed-in session
    let ledger_routes = Router::new()
        .route("/cars", get(fleet::list_cars))
        .route("/drivers", get(fleet::list_drivers))
        .route("/trips", get(trips::list_completed))
        .route("/trips/active", get(trips::active))
        .route("/trips/start", post(trips::start))
        .route("/trips/end", post(trips::end))
        .route("/fuel-records", get(fuel::list).post(fuel::create))
        .route(
            "/service-orders",
            get(service_orders::list).post(service_orders::create),
        )
        .route("/reports", get(reports::report))
        .route("/dashboard", get(reports::dashboard))
        .route("/events", get(events::stream))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let admin_routes = Router::new()
        .route("/cars", post(fleet::create_car))
        .route("/drivers", post(fleet::create_driver))
        .route("/trips/{id}", put(trips::update).delete(trips::delete))
        .route("/fuel-records/{id}", put(fuel::update).delete(fuel::delete))
        .route(
            "/service-orders/{id}",
            put(service_orders::update).delete(service_orders::delete),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api", ledger_routes)
        .nest_service("/uploads", uploads)
        .with_state(state)
}
