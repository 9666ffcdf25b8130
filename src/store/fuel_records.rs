use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{car, fuel_record};
use crate::error::{AppError, AppResult};
use crate::store::non_negative;

#[derive(Debug, Deserialize)]
pub struct NewFuelRecord {
    pub car_id: Uuid,
    pub liters: f64,
    pub value: f64,
    pub km: f64,
    /// Defaults to the time of the request.
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FuelRecordUpdate {
    pub car_id: Option<Uuid>,
    pub liters: Option<f64>,
    pub value: Option<f64>,
    pub km: Option<f64>,
    pub date: Option<DateTime<Utc>>,
}

fn positive_liters(liters: f64) -> AppResult<f64> {
    if !liters.is_finite() || liters <= 0.0 {
        return Err(AppError::Validation(
            "Liters must be greater than zero".to_string(),
        ));
    }
    Ok(liters)
}

async fn ensure_car<C: ConnectionTrait>(db: &C, car_id: Uuid) -> AppResult<()> {
    car::Entity::find_by_id(car_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation("Unknown car".to_string()))
}

/// Fuel purchases, newest first.
pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<fuel_record::Model>> {
    let records = fuel_record::Entity::find()
        .order_by_desc(fuel_record::Column::Date)
        .all(db)
        .await?;
    Ok(records)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    data: NewFuelRecord,
    receipt_photo: Option<String>,
) -> AppResult<fuel_record::Model> {
    let liters = positive_liters(data.liters)?;
    let value = non_negative(data.value, "Value")?;
    let km = non_negative(data.km, "Km")?;
    ensure_car(db, data.car_id).await?;

    let record = fuel_record::ActiveModel {
        id: Set(Uuid::new_v4()),
        car_id: Set(data.car_id),
        liters: Set(liters),
        value: Set(value),
        km: Set(km),
        date: Set(data.date.unwrap_or_else(Utc::now).into()),
        receipt_photo: Set(receipt_photo),
    };

    Ok(record.insert(db).await?)
}

/// Applies the given fields; a new receipt replaces the old one, `None` keeps it.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    data: FuelRecordUpdate,
    receipt_photo: Option<String>,
) -> AppResult<fuel_record::Model> {
    let record = fuel_record::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Fuel record not found".to_string()))?;

    let mut active: fuel_record::ActiveModel = record.into();

    if let Some(car_id) = data.car_id {
        ensure_car(db, car_id).await?;
        active.car_id = Set(car_id);
    }
    if let Some(liters) = data.liters {
        active.liters = Set(positive_liters(liters)?);
    }
    if let Some(value) = data.value {
        active.value = Set(non_negative(value, "Value")?);
    }
    if let Some(km) = data.km {
        active.km = Set(non_negative(km, "Km")?);
    }
    if let Some(date) = data.date {
        active.date = Set(date.into());
    }
    if receipt_photo.is_some() {
        active.receipt_photo = Set(receipt_photo);
    }

    Ok(active.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    let result = fuel_record::Entity::delete_by_id(id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Fuel record not found".to_string()));
    }

    Ok(())
}
