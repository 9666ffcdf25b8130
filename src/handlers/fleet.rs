use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::entities::{car, driver};
use crate::error::AppResult;
use crate::store::{self, cars::NewCar, drivers::NewDriver};
use crate::sync::Topic;
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn list_cars(State(state): State<AppState>) -> AppResult<Json<Vec<car::Model>>> {
    Ok(Json(store::cars::list(&state.db).await?))
}

/// Register a car (admin)
pub async fn create_car(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewCar>,
) -> AppResult<(StatusCode, Json<car::Model>)> {
    let car = store::cars::create(&state.db, payload).await?;
    state.notifier.publish(Topic::Cars);

    tracing::info!(car_id = %car.id, plate = %car.plate, by = %claims.username, "Car registered");

    Ok((StatusCode::CREATED, Json(car)))
}

pub async fn list_drivers(State(state): State<AppState>) -> AppResult<Json<Vec<driver::Model>>> {
    Ok(Json(store::drivers::list(&state.db).await?))
}

/// Register a driver (admin)
pub async fn create_driver(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewDriver>,
) -> AppResult<(StatusCode, Json<driver::Model>)> {
    let driver = store::drivers::create(&state.db, payload).await?;
    state.notifier.publish(Topic::Drivers);

    tracing::info!(driver_id = %driver.id, by = %claims.username, "Driver registered");

    Ok((StatusCode::CREATED, Json(driver)))
}
