use chrono::{Datelike, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::car;
use crate::error::{AppError, AppResult};
use crate::store::required_text;

#[derive(Debug, Deserialize)]
pub struct NewCar {
    pub model: String,
    pub plate: String,
    pub year: Option<i32>,
}

/// All cars, by model name.
pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<car::Model>> {
    let cars = car::Entity::find()
        .order_by_asc(car::Column::Model)
        .order_by_asc(car::Column::Plate)
        .all(db)
        .await?;
    Ok(cars)
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<car::Model>> {
    Ok(car::Entity::find_by_id(id).one(db).await?)
}

pub async fn create<C: ConnectionTrait>(db: &C, data: NewCar) -> AppResult<car::Model> {
    let model = required_text(&data.model, "Model")?;
    let plate = required_text(&data.plate, "Plate")?.to_uppercase();

    if let Some(year) = data.year {
        let latest = Utc::now().year() + 1;
        if !(1900..=latest).contains(&year) {
            return Err(AppError::Validation(format!(
                "Year must be between 1900 and {}",
                latest
            )));
        }
    }

    let car = car::ActiveModel {
        id: Set(Uuid::new_v4()),
        model: Set(model),
        plate: Set(plate.clone()),
        year: Set(data.year),
        created_at: Set(Utc::now().into()),
    };

    car.insert(db).await.map_err(|e| {
        AppError::conflict_on_unique(e, &format!("A car with plate {} already exists", plate))
    })
}
