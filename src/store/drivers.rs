use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::driver;
use crate::error::AppResult;
use crate::store::{optional_text, required_text};

#[derive(Debug, Deserialize)]
pub struct NewDriver {
    pub name: String,
    pub license: String,
    pub contact: Option<String>,
}

/// All drivers, by name.
pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<driver::Model>> {
    let drivers = driver::Entity::find()
        .order_by_asc(driver::Column::Name)
        .all(db)
        .await?;
    Ok(drivers)
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<driver::Model>> {
    Ok(driver::Entity::find_by_id(id).one(db).await?)
}

pub async fn create<C: ConnectionTrait>(db: &C, data: NewDriver) -> AppResult<driver::Model> {
    let name = required_text(&data.name, "Name")?;
    let license = required_text(&data.license, "License")?;

    let driver = driver::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        license: Set(license),
        contact: Set(optional_text(data.contact)),
        created_at: Set(Utc::now().into()),
    };

    Ok(driver.insert(db).await?)
}
