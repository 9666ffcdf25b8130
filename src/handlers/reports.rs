use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::metrics::report::{build_dashboard, build_report, DashboardStats, PeriodReport, ReportKind};
use crate::metrics::Period;
use crate::store;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub kind: ReportKind,
    /// Instant the period is built around; defaults to now in the configured offset.
    pub reference: Option<DateTime<FixedOffset>>,
}

/// Period report, read straight from the store
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<PeriodReport>> {
    let reference = query
        .reference
        .unwrap_or_else(|| Utc::now().with_timezone(&state.config.report_offset));

    let trips = store::trips::list_completed(&state.db).await?;
    let fuel_records = store::fuel_records::list(&state.db).await?;

    let report = build_report(&trips, &fuel_records, query.period, query.kind, reference);

    tracing::debug!(
        period = ?query.period,
        kind = ?query.kind,
        trips = report.summary.trip_count,
        fuel_records = report.summary.fuel_count,
        "Report built"
    );

    Ok(Json(report))
}

/// Dashboard numbers, served from the ledger cache
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let mut snapshot = state.cache.snapshot().await;
    if snapshot.refreshed_at.is_none() {
        state.cache.refresh_all().await?;
        snapshot = state.cache.snapshot().await;
    }

    Ok(Json(build_dashboard(
        &snapshot.trips,
        snapshot.active_trip.as_ref(),
        snapshot.cars.len(),
        snapshot.drivers.len(),
    )))
}
