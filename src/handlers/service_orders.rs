use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::service_order;
use crate::error::AppResult;
use crate::services::blob::{store_attachment, Bucket};
use crate::store::{
    self,
    service_orders::{NewServiceOrder, ServiceOrderUpdate},
};
use crate::sync::Topic;
use crate::utils::attachment::Attachment;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateServiceOrderRequest {
    #[serde(flatten)]
    pub order: NewServiceOrder,
    pub photo: Option<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceOrderRequest {
    #[serde(flatten)]
    pub changes: ServiceOrderUpdate,
    pub photo: Option<Attachment>,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<service_order::Model>>> {
    Ok(Json(store::service_orders::list(&state.db).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateServiceOrderRequest>,
) -> AppResult<(StatusCode, Json<service_order::Model>)> {
    let photo_url =
        store_attachment(state.blobs.as_ref(), Bucket::ServiceOrders, payload.photo.as_ref())
            .await?;

    let order = store::service_orders::create(&state.db, payload.order, photo_url).await?;
    state.notifier.publish(Topic::ServiceOrders);

    tracing::info!(order_id = %order.id, client = %order.client_name, by = %claims.username, "Service order created");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Edit a service order, including finalizing it (admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceOrderRequest>,
) -> AppResult<Json<service_order::Model>> {
    let photo_url =
        store_attachment(state.blobs.as_ref(), Bucket::ServiceOrders, payload.photo.as_ref())
            .await?;

    let order = store::service_orders::update(&state.db, id, payload.changes, photo_url).await?;
    state.notifier.publish(Topic::ServiceOrders);

    tracing::info!(order_id = %id, status = ?order.status, by = %claims.username, "Service order updated");

    Ok(Json(order))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    store::service_orders::delete(&state.db, id).await?;
    state.notifier.publish(Topic::ServiceOrders);

    tracing::info!(order_id = %id, by = %claims.username, "Service order deleted");

    Ok(StatusCode::NO_CONTENT)
}
