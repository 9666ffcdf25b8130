use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::fuel_record;
use crate::error::AppResult;
use crate::services::blob::{store_attachment, Bucket};
use crate::store::{
    self,
    fuel_records::{FuelRecordUpdate, NewFuelRecord},
};
use crate::sync::Topic;
use crate::utils::attachment::Attachment;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFuelRecordRequest {
    #[serde(flatten)]
    pub record: NewFuelRecord,
    pub receipt: Option<Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFuelRecordRequest {
    #[serde(flatten)]
    pub changes: FuelRecordUpdate,
    /// Replaces the stored receipt when present.
    pub receipt: Option<Attachment>,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<fuel_record::Model>>> {
    Ok(Json(store::fuel_records::list(&state.db).await?))
}

/// Record a fuel purchase
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateFuelRecordRequest>,
) -> AppResult<(StatusCode, Json<fuel_record::Model>)> {
    let receipt_photo =
        store_attachment(state.blobs.as_ref(), Bucket::FuelReceipts, payload.receipt.as_ref())
            .await?;

    let record = store::fuel_records::create(&state.db, payload.record, receipt_photo).await?;
    state.notifier.publish(Topic::FuelRecords);

    tracing::info!(
        record_id = %record.id,
        car_id = %record.car_id,
        liters = record.liters,
        by = %claims.username,
        "Fuel record created"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// Edit a fuel record (admin)
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFuelRecordRequest>,
) -> AppResult<Json<fuel_record::Model>> {
    let receipt_photo =
        store_attachment(state.blobs.as_ref(), Bucket::FuelReceipts, payload.receipt.as_ref())
            .await?;

    let record = store::fuel_records::update(&state.db, id, payload.changes, receipt_photo).await?;
    state.notifier.publish(Topic::FuelRecords);

    tracing::info!(record_id = %id, by = %claims.username, "Fuel record updated");

    Ok(Json(record))
}

/// Delete a fuel record (admin)
pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    store::fuel_records::delete(&state.db, id).await?;
    state.notifier.publish(Topic::FuelRecords);

    tracing::info!(record_id = %id, by = %claims.username, "Fuel record deleted");

    Ok(StatusCode::NO_CONTENT)
}
