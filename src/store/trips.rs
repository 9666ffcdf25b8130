use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::trip::{self, TripStatus};
use crate::entities::{car, driver};
use crate::error::{AppError, AppResult};
use crate::store::{non_negative, optional_text, required_text};

/// Read-side projection of a trip with the car and driver fields a listing shows.
/// Never written back; the normalized rows stay the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripView {
    #[serde(flatten)]
    pub trip: trip::Model,
    pub car_model: String,
    pub car_plate: String,
    pub driver_name: String,
    pub distance_km: Option<f64>,
}

impl TripView {
    pub fn new(trip: trip::Model, cars: &[car::Model], drivers: &[driver::Model]) -> Self {
        let car = cars.iter().find(|c| c.id == trip.car_id);
        let driver = drivers.iter().find(|d| d.id == trip.driver_id);

        Self {
            car_model: car.map(|c| c.model.clone()).unwrap_or_default(),
            car_plate: car.map(|c| c.plate.clone()).unwrap_or_default(),
            driver_name: driver.map(|d| d.name.clone()).unwrap_or_default(),
            distance_km: trip.distance_km(),
            trip,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TripUpdate {
    pub car_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub observations: Option<String>,
}

pub async fn project<C: ConnectionTrait>(db: &C, trips: Vec<trip::Model>) -> AppResult<Vec<TripView>> {
    if trips.is_empty() {
        return Ok(Vec::new());
    }

    let cars = car::Entity::find().all(db).await?;
    let drivers = driver::Entity::find().all(db).await?;

    Ok(trips
        .into_iter()
        .map(|t| TripView::new(t, &cars, &drivers))
        .collect())
}

pub async fn view<C: ConnectionTrait>(db: &C, trip: trip::Model) -> AppResult<TripView> {
    project(db, vec![trip])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Trip projection came back empty".to_string()))
}

/// Completed trips, most recently finished first.
pub async fn list_completed<C: ConnectionTrait>(db: &C) -> AppResult<Vec<TripView>> {
    let trips = trip::Entity::find()
        .filter(trip::Column::Status.eq(TripStatus::Completed))
        .order_by_desc(trip::Column::EndTime)
        .order_by_desc(trip::Column::StartTime)
        .all(db)
        .await?;

    project(db, trips).await
}

pub async fn find_active<C: ConnectionTrait>(db: &C) -> AppResult<Option<trip::Model>> {
    let active = trip::Entity::find()
        .filter(trip::Column::Status.eq(TripStatus::Active))
        .one(db)
        .await?;
    Ok(active)
}

pub async fn find_active_view<C: ConnectionTrait>(db: &C) -> AppResult<Option<TripView>> {
    match find_active(db).await? {
        Some(active) => Ok(Some(view(db, active).await?)),
        None => Ok(None),
    }
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<trip::Model> {
    trip::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))
}

/// Checks the odometer pair a completed trip would end up with.
pub(crate) fn validate_readings(start_km: f64, end_km: f64) -> AppResult<()> {
    non_negative(start_km, "Start km")?;
    non_negative(end_km, "End km")?;
    if end_km < start_km {
        return Err(AppError::Validation(format!(
            "End km ({}) cannot be lower than start km ({})",
            end_km, start_km
        )));
    }
    Ok(())
}

pub async fn update<C: ConnectionTrait>(db: &C, id: Uuid, data: TripUpdate) -> AppResult<trip::Model> {
    let existing = find(db, id).await?;

    if existing.status == TripStatus::Active && data.end_km.is_some() {
        return Err(AppError::Validation(
            "End the trip before recording its final km".to_string(),
        ));
    }

    let start_km = match data.start_km {
        Some(km) => non_negative(km, "Start km")?,
        None => existing.start_km,
    };
    if let Some(end_km) = data.end_km.or(existing.end_km) {
        validate_readings(start_km, end_km)?;
    }

    if let Some(car_id) = data.car_id {
        if car::Entity::find_by_id(car_id).one(db).await?.is_none() {
            return Err(AppError::Validation("Unknown car".to_string()));
        }
    }
    if let Some(driver_id) = data.driver_id {
        if driver::Entity::find_by_id(driver_id).one(db).await?.is_none() {
            return Err(AppError::Validation("Unknown driver".to_string()));
        }
    }

    let mut active: trip::ActiveModel = existing.into();

    if let Some(car_id) = data.car_id {
        active.car_id = Set(car_id);
    }
    if let Some(driver_id) = data.driver_id {
        active.driver_id = Set(driver_id);
    }
    if data.start_km.is_some() {
        active.start_km = Set(start_km);
    }
    if let Some(end_km) = data.end_km {
        active.end_km = Set(Some(end_km));
    }
    if let Some(origin) = data.origin {
        active.origin = Set(required_text(&origin, "Origin")?);
    }
    if let Some(destination) = data.destination {
        active.destination = Set(optional_text(Some(destination)));
    }
    if let Some(observations) = data.observations {
        active.observations = Set(optional_text(Some(observations)));
    }

    Ok(active.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    let result = trip::Entity::delete_by_id(id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Trip not found".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_readings() {
        assert!(validate_readings(1000.0, 1150.0).is_ok());
        assert!(validate_readings(1000.0, 1000.0).is_ok());
        assert!(matches!(
            validate_readings(1000.0, 999.0),
            Err(AppError::Validation(_))
        ));
        assert!(validate_readings(-5.0, 10.0).is_err());
    }
}
