mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_ledger::entities::user::UserRole;
use fleet_ledger::handlers::auth::seed_admin;
use fleet_ledger::routes::create_router;
use fleet_ledger::utils::jwt::verify_token;

use common::{seed_fleet, test_state, token, JWT_SECRET, PLACE};

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_api_requires_a_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let (status, body) = send(&app, Method::GET, "/api/cars", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthorized");

    let (status, _) = send(&app, Method::GET, "/api/cars", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);
    let car = json!({ "model": "Toyota Corolla", "plate": "ABC-1234", "year": 2020 });

    let user = token(UserRole::User);
    let (status, body) =
        send(&app, Method::POST, "/api/admin/cars", Some(user.as_str()), Some(car.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "forbidden");

    let admin = token(UserRole::Admin);
    let (status, created) =
        send(&app, Method::POST, "/api/admin/cars", Some(admin.as_str()), Some(car.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["plate"], "ABC-1234");

    let (status, duplicate) =
        send(&app, Method::POST, "/api/admin/cars", Some(admin.as_str()), Some(car)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["error"]["kind"], "conflict");

    // Reading is open to any session
    let (status, cars) = send(&app, Method::GET, "/api/cars", Some(user.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cars.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_register_login_and_elevate() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    seed_admin(&state).await.unwrap();
    let app = create_router(state);

    let credentials = json!({ "username": "Joao", "password": "segredo123" });
    let (status, registered) =
        send(&app, Method::POST, "/api/auth/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered["user"]["username"], "joao");
    assert_eq!(registered["user"]["role"], "user");

    let (status, _) =
        send(&app, Method::POST, "/api/auth/register", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "joao", "password": "errada" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A regular account cannot elevate
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/elevate",
        None,
        Some(json!({ "username": "joao", "password": "segredo123" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, elevated) = send(
        &app,
        Method::POST,
        "/api/auth/elevate",
        None,
        Some(json!({ "username": "admin", "password": "admin-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(elevated["expires_in_seconds"], 300);

    let claims = verify_token(elevated["token"].as_str().unwrap(), JWT_SECRET).unwrap();
    assert_eq!(claims.role, UserRole::Admin);
    assert!(claims.elevated);
}

#[tokio::test]
async fn test_trip_flow_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    let (car_id, driver_id) = seed_fleet(&state.db).await;
    let mut changes = state.notifier.subscribe();
    let app = create_router(state);
    let user = token(UserRole::User);

    let (status, active) = send(&app, Method::GET, "/api/trips/active", Some(user.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(active.is_null());

    let (status, started) = send(
        &app,
        Method::POST,
        "/api/trips/start",
        Some(user.as_str()),
        Some(json!({
            "car_id": car_id,
            "driver_id": driver_id,
            "start_km": 1000.0,
            "coordinates": { "lat": -23.5614, "lon": -46.6559 },
            "odometer_photo": { "file_name": "odometro.jpg", "data": "aGVsbG8=" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["origin"], PLACE);
    assert_eq!(started["status"], "active");
    assert_eq!(started["car_plate"], "ABC-1234");
    let photo = started["start_odometer_photo"].as_str().unwrap();
    assert!(photo.starts_with("/uploads/odometer-photos/"));
    assert_eq!(std::fs::read_dir(dir.path().join("odometer-photos")).unwrap().count(), 1);

    let change = changes.recv().await.unwrap();
    assert_eq!(change.topic.as_str(), "trips");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/trips/start",
        Some(user.as_str()),
        Some(json!({
            "car_id": car_id,
            "driver_id": driver_id,
            "start_km": 1000.0,
            "origin": "Garagem"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, ended) = send(
        &app,
        Method::POST,
        "/api/trips/end",
        Some(user.as_str()),
        Some(json!({ "end_km": 1150.0, "destination": "Cliente Campinas" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ended["status"], "completed");
    assert_eq!(ended["destination"], "Cliente Campinas");
    assert_eq!(ended["distance_km"], 150.0);

    let (status, report) =
        send(&app, Method::GET, "/api/reports?period=monthly", Some(user.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["distance_km"], 150.0);
    assert_eq!(report["summary"]["trip_count"], 1);

    let (status, dashboard) = send(&app, Method::GET, "/api/dashboard", Some(user.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_distance_km"], 150.0);
    assert_eq!(dashboard["car_count"], 1);
    assert!(dashboard["active_trip"].is_null());
}

#[tokio::test]
async fn test_rejected_upload_leaves_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    let (car_id, _) = seed_fleet(&state.db).await;
    let app = create_router(state);
    let user = token(UserRole::User);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/fuel-records",
        Some(user.as_str()),
        Some(json!({
            "car_id": car_id,
            "liters": 40.0,
            "value": 220.0,
            "km": 1150.0,
            "receipt": { "file_name": "nota.exe", "data": "aGVsbG8=" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["kind"], "upload");

    let (_, records) = send(&app, Method::GET, "/api/fuel-records", Some(user.as_str()), None).await;
    assert_eq!(records.as_array().map(Vec::len), Some(0));

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/fuel-records",
        Some(user.as_str()),
        Some(json!({ "car_id": car_id, "liters": 40.0, "value": 220.0, "km": 1150.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["value"], 220.0);

    let id = created["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/fuel-records/{}", id),
        Some(user.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/fuel-records/{}", id),
        Some(token(UserRole::Admin).as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
