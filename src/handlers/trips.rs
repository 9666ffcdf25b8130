use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::blob::{store_attachment, Bucket};
use crate::services::location::{resolve_location, Coordinates};
use crate::services::trip_lifecycle::{self, EndTrip, StartTrip};
use crate::store::{self, trips::{TripUpdate, TripView}};
use crate::sync::Topic;
use crate::utils::attachment::Attachment;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StartTripRequest {
    pub car_id: Uuid,
    pub driver_id: Uuid,
    pub start_km: f64,
    /// GPS fix taken when the form was submitted.
    pub coordinates: Option<Coordinates>,
    /// Typed origin, used when there is no GPS fix.
    pub origin: Option<String>,
    pub odometer_photo: Option<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct EndTripRequest {
    pub end_km: f64,
    pub coordinates: Option<Coordinates>,
    pub destination: Option<String>,
    pub observations: Option<String>,
    pub odometer_photo: Option<Attachment>,
}

/// Completed trips, newest first
pub async fn list_completed(State(state): State<AppState>) -> AppResult<Json<Vec<TripView>>> {
    Ok(Json(store::trips::list_completed(&state.db).await?))
}

pub async fn active(State(state): State<AppState>) -> AppResult<Json<Option<TripView>>> {
    Ok(Json(store::trips::find_active_view(&state.db).await?))
}

/// Start a trip. Location and photo are resolved before anything is written.
pub async fn start(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartTripRequest>,
) -> AppResult<(StatusCode, Json<TripView>)> {
    // Fail fast so the geocoder and blob store are not hit for a doomed request.
    trip_lifecycle::ensure_no_active_trip(&state.db).await?;

    let origin = resolve_location(
        state.geocoder.as_ref(),
        payload.coordinates,
        payload.origin.as_deref(),
        state.config.location_timeout,
    )
    .await?;

    let start_photo_url = store_attachment(
        state.blobs.as_ref(),
        Bucket::OdometerPhotos,
        payload.odometer_photo.as_ref(),
    )
    .await?;

    let trip = trip_lifecycle::start_trip(
        &state.db,
        StartTrip {
            car_id: payload.car_id,
            driver_id: payload.driver_id,
            start_km: payload.start_km,
            origin,
            start_photo_url,
        },
    )
    .await?;
    state.notifier.publish(Topic::Trips);

    tracing::debug!(trip_id = %trip.id, origin = %trip.origin, by = %claims.username, "Start recorded");

    Ok((StatusCode::CREATED, Json(store::trips::view(&state.db, trip).await?)))
}

/// Finish the active trip
pub async fn end(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<EndTripRequest>,
) -> AppResult<Json<TripView>> {
    let current = trip_lifecycle::current_trip(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active trip".to_string()))?;
    store::trips::validate_readings(current.start_km, payload.end_km)?;

    let destination = resolve_location(
        state.geocoder.as_ref(),
        payload.coordinates,
        payload.destination.as_deref(),
        state.config.location_timeout,
    )
    .await?;

    let end_photo_url = store_attachment(
        state.blobs.as_ref(),
        Bucket::OdometerPhotos,
        payload.odometer_photo.as_ref(),
    )
    .await?;

    let trip = trip_lifecycle::end_trip(
        &state.db,
        EndTrip {
            end_km: payload.end_km,
            destination,
            observations: payload.observations,
            end_photo_url,
        },
    )
    .await?;
    state.notifier.publish(Topic::Trips);

    tracing::debug!(trip_id = %trip.id, destination = ?trip.destination, by = %claims.username, "End recorded");

    Ok(Json(store::trips::view(&state.db, trip).await?))
}

/// Edit a trip (admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TripUpdate>,
) -> AppResult<Json<TripView>> {
    let trip = store::trips::update(&state.db, id, payload).await?;
    state.notifier.publish(Topic::Trips);

    tracing::info!(trip_id = %id, by = %claims.username, "Trip updated");

    Ok(Json(store::trips::view(&state.db, trip).await?))
}

/// Delete a trip (admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    store::trips::delete(&state.db, id).await?;
    state.notifier.publish(Topic::Trips);

    tracing::info!(trip_id = %id, by = %claims.username, "Trip deleted");

    Ok(StatusCode::NO_CONTENT)
}
