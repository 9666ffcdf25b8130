use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::entities::fuel_record;
use crate::metrics::{
    filter_by_period, fuel_efficiency, period_bounds, round_currency, round_distance,
    total_distance, total_fuel_cost, total_liters, Period, Timestamped,
};
use crate::store::trips::TripView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    All,
    Trips,
    Fuel,
}

impl ReportKind {
    fn includes_trips(&self) -> bool {
        matches!(self, ReportKind::All | ReportKind::Trips)
    }

    fn includes_fuel(&self) -> bool {
        matches!(self, ReportKind::All | ReportKind::Fuel)
    }
}

impl Timestamped for TripView {
    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.trip.timestamp()
    }
}

/// Period totals, rounded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub distance_km: f64,
    pub fuel_cost: f64,
    pub liters: f64,
    pub km_per_liter: f64,
    pub trip_count: usize,
    pub fuel_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub period: Period,
    pub kind: ReportKind,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub summary: ReportSummary,
    pub trips: Vec<TripView>,
    pub fuel_records: Vec<fuel_record::Model>,
}

/// Cuts trips (by end time) and fuel (by date) to the period around `reference`.
/// The summary always covers both; `kind` only picks which line items are listed.
pub fn build_report(
    trips: &[TripView],
    fuel_records: &[fuel_record::Model],
    period: Period,
    kind: ReportKind,
    reference: DateTime<FixedOffset>,
) -> PeriodReport {
    let bounds = period_bounds(period, reference);
    let trips = filter_by_period(trips, period, reference);
    let fuel_records = filter_by_period(fuel_records, period, reference);

    let summary = ReportSummary {
        distance_km: round_distance(total_distance(trips.iter().map(|v| &v.trip))),
        fuel_cost: round_currency(total_fuel_cost(&fuel_records)),
        liters: round_currency(total_liters(&fuel_records)),
        km_per_liter: round_currency(fuel_efficiency(
            trips.iter().map(|v| &v.trip),
            &fuel_records,
        )),
        trip_count: trips.len(),
        fuel_count: fuel_records.len(),
    };

    PeriodReport {
        period,
        kind,
        start: bounds.start,
        end: bounds.end,
        summary,
        trips: if kind.includes_trips() { trips } else { Vec::new() },
        fuel_records: if kind.includes_fuel() { fuel_records } else { Vec::new() },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_distance_km: f64,
    pub trip_count: usize,
    pub car_count: usize,
    pub driver_count: usize,
    pub active_trip: Option<TripView>,
    pub recent_trips: Vec<TripView>,
}

const RECENT_TRIPS: usize = 5;

/// Headline numbers over every completed trip. `trips` is expected newest first.
pub fn build_dashboard(
    trips: &[TripView],
    active_trip: Option<&TripView>,
    car_count: usize,
    driver_count: usize,
) -> DashboardStats {
    DashboardStats {
        total_distance_km: round_distance(total_distance(trips.iter().map(|v| &v.trip))),
        trip_count: trips.len(),
        car_count,
        driver_count,
        active_trip: active_trip.cloned(),
        recent_trips: trips.iter().take(RECENT_TRIPS).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::*;

    fn view(start_km: f64, end_km: f64, end_time: &str) -> TripView {
        TripView::new(completed_trip(start_km, end_km, end_time), &[], &[])
    }

    #[test]
    fn test_report_keeps_only_the_period() {
        let trips = vec![
            view(1000.0, 1150.0, "2026-03-04T10:00:00+00:00"),
            view(900.0, 1000.0, "2026-02-27T10:00:00+00:00"),
        ];
        let fuel_records = vec![
            fuel(40.0, 220.0, "2026-03-04T11:00:00+00:00"),
            fuel(30.0, 150.0, "2026-02-20T11:00:00+00:00"),
        ];

        let report = build_report(
            &trips,
            &fuel_records,
            Period::Weekly,
            ReportKind::All,
            at("2026-03-04T12:00:00+00:00"),
        );

        assert_eq!(report.summary.trip_count, 1);
        assert_eq!(report.summary.distance_km, 150.0);
        assert_eq!(report.summary.fuel_cost, 220.0);
        assert_eq!(report.summary.liters, 40.0);
        assert_eq!(report.summary.km_per_liter, 3.75);
        assert_eq!(report.start, at("2026-03-02T00:00:00+00:00"));
    }

    #[test]
    fn test_kind_hides_sections_but_not_totals() {
        let trips = vec![view(0.0, 100.0, "2026-03-04T10:00:00+00:00")];
        let fuel_records = vec![fuel(10.0, 50.0, "2026-03-04T11:00:00+00:00")];
        let reference = at("2026-03-04T12:00:00+00:00");

        let fuel_only = build_report(&trips, &fuel_records, Period::Daily, ReportKind::Fuel, reference);
        assert!(fuel_only.trips.is_empty());
        assert_eq!(fuel_only.fuel_records.len(), 1);
        assert_eq!(fuel_only.summary.distance_km, 100.0);

        let trips_only = build_report(&trips, &fuel_records, Period::Daily, ReportKind::Trips, reference);
        assert_eq!(trips_only.trips.len(), 1);
        assert!(trips_only.fuel_records.is_empty());
    }

    #[test]
    fn test_summary_is_rounded() {
        let trips = vec![view(0.0, 100.0, "2026-03-04T10:00:00+00:00")];
        let fuel_records = vec![fuel(3.0, 19.999, "2026-03-04T11:00:00+00:00")];

        let report = build_report(
            &trips,
            &fuel_records,
            Period::Monthly,
            ReportKind::All,
            at("2026-03-15T12:00:00+00:00"),
        );

        assert_eq!(report.summary.fuel_cost, 20.0);
        assert_eq!(report.summary.km_per_liter, 33.33);
    }

    #[test]
    fn test_dashboard() {
        let trips: Vec<TripView> = (0..7)
            .map(|i| view(0.0, 10.0, &format!("2026-03-0{}T10:00:00+00:00", i + 1)))
            .collect();

        let stats = build_dashboard(&trips, None, 3, 2);
        assert_eq!(stats.total_distance_km, 70.0);
        assert_eq!(stats.trip_count, 7);
        assert_eq!(stats.recent_trips.len(), 5);
        assert_eq!(stats.car_count, 3);
        assert!(stats.active_trip.is_none());
    }
}
