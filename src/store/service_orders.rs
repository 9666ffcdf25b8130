use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::service_order::{self, ServiceOrderStatus};
use crate::error::{AppError, AppResult};
use crate::store::{optional_text, required_text};

#[derive(Debug, Deserialize)]
pub struct NewServiceOrder {
    pub requesting_company: String,
    pub client_name: String,
    pub description: String,
    pub contact_info: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceOrderUpdate {
    pub requesting_company: Option<String>,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub contact_info: Option<String>,
    pub status: Option<ServiceOrderStatus>,
}

/// Service orders, newest first.
pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<service_order::Model>> {
    let orders = service_order::Entity::find()
        .order_by_desc(service_order::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(orders)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    data: NewServiceOrder,
    photo_url: Option<String>,
) -> AppResult<service_order::Model> {
    let order = service_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        requesting_company: Set(required_text(&data.requesting_company, "Requesting company")?),
        client_name: Set(required_text(&data.client_name, "Client name")?),
        description: Set(required_text(&data.description, "Description")?),
        contact_info: Set(optional_text(data.contact_info)),
        photo_url: Set(photo_url),
        status: Set(ServiceOrderStatus::Pending),
        created_at: Set(Utc::now().into()),
    };

    Ok(order.insert(db).await?)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    data: ServiceOrderUpdate,
    photo_url: Option<String>,
) -> AppResult<service_order::Model> {
    let order = service_order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service order not found".to_string()))?;

    let mut active: service_order::ActiveModel = order.into();

    if let Some(company) = data.requesting_company {
        active.requesting_company = Set(required_text(&company, "Requesting company")?);
    }
    if let Some(client) = data.client_name {
        active.client_name = Set(required_text(&client, "Client name")?);
    }
    if let Some(description) = data.description {
        active.description = Set(required_text(&description, "Description")?);
    }
    if let Some(contact) = data.contact_info {
        active.contact_info = Set(optional_text(Some(contact)));
    }
    if let Some(status) = data.status {
        active.status = Set(status);
    }
    if photo_url.is_some() {
        active.photo_url = Set(photo_url);
    }

    Ok(active.update(db).await?)
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    let result = service_order::Entity::delete_by_id(id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Service order not found".to_string()));
    }

    Ok(())
}
