//! The single-active-trip state machine: `NoActiveTrip -> ActiveTrip -> NoActiveTrip`.
//!
//! The `trips` table carries a partial unique index on `status = 'active'`, and that
//! index is what decides a race between two sessions. Each transition is a single
//! write statement: a read-then-write transaction would take a shared lock first and,
//! on SQLite, lose the race with a lock error instead of the index violation.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::trip::{self, TripStatus};
use crate::entities::{car, driver};
use crate::error::{AppError, AppResult};
use crate::store::{self, non_negative, optional_text, required_text};

const ALREADY_ACTIVE: &str = "A trip is already in progress; end it before starting another";

#[derive(Debug, Clone)]
pub struct StartTrip {
    pub car_id: Uuid,
    pub driver_id: Uuid,
    pub start_km: f64,
    pub origin: String,
    pub start_photo_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EndTrip {
    pub end_km: f64,
    pub destination: String,
    pub observations: Option<String>,
    pub end_photo_url: Option<String>,
}

/// The trip currently running, if any. Always read from the database.
pub async fn current_trip(db: &DatabaseConnection) -> AppResult<Option<trip::Model>> {
    store::trips::find_active(db).await
}

/// Fails with `Conflict` when the database already holds an active trip.
pub async fn ensure_no_active_trip(db: &DatabaseConnection) -> AppResult<()> {
    if let Some(active) = current_trip(db).await? {
        tracing::warn!(active_trip = %active.id, "Start refused, trip already active");
        return Err(AppError::Conflict(ALREADY_ACTIVE.to_string()));
    }
    Ok(())
}

pub async fn start_trip(db: &DatabaseConnection, input: StartTrip) -> AppResult<trip::Model> {
    let start_km = non_negative(input.start_km, "Start km")?;
    let origin = required_text(&input.origin, "Origin")?;

    ensure_no_active_trip(db).await?;

    if car::Entity::find_by_id(input.car_id).one(db).await?.is_none() {
        return Err(AppError::Validation("Unknown car".to_string()));
    }
    if driver::Entity::find_by_id(input.driver_id).one(db).await?.is_none() {
        return Err(AppError::Validation("Unknown driver".to_string()));
    }

    let trip = trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        car_id: Set(input.car_id),
        driver_id: Set(input.driver_id),
        start_km: Set(start_km),
        end_km: Set(None),
        origin: Set(origin),
        destination: Set(None),
        observations: Set(None),
        start_odometer_photo: Set(input.start_photo_url),
        end_odometer_photo: Set(None),
        status: Set(TripStatus::Active),
        start_time: Set(Utc::now().into()),
        end_time: Set(None),
    };

    let trip = match trip.insert(db).await {
        Ok(trip) => trip,
        Err(e) => return Err(lost_start_race(db, e).await),
    };

    tracing::info!(
        trip_id = %trip.id,
        car_id = %trip.car_id,
        driver_id = %trip.driver_id,
        start_km = trip.start_km,
        "Trip started"
    );

    Ok(trip)
}

/// Classifies a failed insert. A unique violation means another session won the race.
/// Any other storage failure is checked against the table: if a trip is active now,
/// the caller lost the race all the same.
async fn lost_start_race(db: &DatabaseConnection, err: DbErr) -> AppError {
    let err = AppError::conflict_on_unique(err, ALREADY_ACTIVE);
    if !matches!(err, AppError::Storage(_)) {
        tracing::warn!("Start refused by the single-active-trip index");
        return err;
    }

    match store::trips::find_active(db).await {
        Ok(Some(active)) => {
            tracing::warn!(active_trip = %active.id, error = %err, "Start lost the race to another session");
            AppError::Conflict(ALREADY_ACTIVE.to_string())
        }
        _ => err,
    }
}

pub async fn end_trip(db: &DatabaseConnection, input: EndTrip) -> AppResult<trip::Model> {
    let destination = required_text(&input.destination, "Destination")?;

    let active = store::trips::find_active(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active trip".to_string()))?;

    store::trips::validate_readings(active.start_km, input.end_km)?;

    let changes = trip::ActiveModel {
        end_km: Set(Some(input.end_km)),
        destination: Set(Some(destination)),
        observations: Set(optional_text(input.observations)),
        end_odometer_photo: Set(input.end_photo_url),
        status: Set(TripStatus::Completed),
        end_time: Set(Some(Utc::now().into())),
        ..Default::default()
    };

    // Conditional on the row still being active, so a concurrent end cannot overwrite it.
    let result = trip::Entity::update_many()
        .set(changes)
        .filter(trip::Column::Id.eq(active.id))
        .filter(trip::Column::Status.eq(TripStatus::Active))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("No active trip".to_string()));
    }

    let completed = store::trips::find(db, active.id).await?;

    tracing::info!(
        trip_id = %completed.id,
        distance_km = completed.distance_km().unwrap_or_default(),
        "Trip completed"
    );

    Ok(completed)
}
