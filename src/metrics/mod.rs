//! Derived statistics over in-memory snapshots of trips and fuel records.
//!
//! Everything here is pure: no I/O and no clock reads. Values carry full `f64`
//! precision; rounding happens only when a [`report::PeriodReport`] is assembled.

pub mod period;
pub mod report;

use crate::entities::{fuel_record, trip};

pub use period::{filter_by_period, period_bounds, Period, PeriodBounds, Timestamped};

/// Sum of `end_km - start_km`. Trips without an end reading contribute nothing.
pub fn total_distance<'a, I>(trips: I) -> f64
where
    I: IntoIterator<Item = &'a trip::Model>,
{
    trips.into_iter().filter_map(|t| t.distance_km()).sum()
}

pub fn total_fuel_cost<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a fuel_record::Model>,
{
    records.into_iter().map(|r| r.value).sum()
}

pub fn total_liters<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a fuel_record::Model>,
{
    records.into_iter().map(|r| r.liters).sum()
}

/// Kilometres per litre; 0 when no fuel was recorded.
pub fn fuel_efficiency<'a, T, F>(trips: T, records: F) -> f64
where
    T: IntoIterator<Item = &'a trip::Model>,
    F: IntoIterator<Item = &'a fuel_record::Model>,
{
    let liters = total_liters(records);
    if liters == 0.0 {
        return 0.0;
    }
    total_distance(trips) / liters
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round_currency(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn round_distance(value: f64) -> f64 {
    round_to(value, 1)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_total_distance_empty_is_zero() {
        let trips: Vec<trip::Model> = Vec::new();
        assert_eq!(total_distance(&trips), 0.0);
    }

    #[test]
    fn test_total_distance_skips_unfinished_trips() {
        let trips = vec![
            completed_trip(1000.0, 1150.0, "2026-03-04T10:00:00+00:00"),
            active_trip(1150.0),
            completed_trip(1150.0, 1200.5, "2026-03-05T10:00:00+00:00"),
        ];
        assert_eq!(total_distance(&trips), 200.5);
    }

    #[test]
    fn test_fuel_totals() {
        let records = vec![fuel(40.0, 220.0, "2026-03-04T10:00:00+00:00")];
        assert_eq!(total_fuel_cost(&records), 220.0);
        assert_eq!(total_liters(&records), 40.0);
    }

    #[test]
    fn test_fuel_efficiency_without_fuel_is_zero() {
        let trips = vec![completed_trip(0.0, 300.0, "2026-03-04T10:00:00+00:00")];
        let records: Vec<fuel_record::Model> = Vec::new();

        let efficiency = fuel_efficiency(&trips, &records);
        assert_eq!(efficiency, 0.0);
        assert!(!efficiency.is_nan());
    }

    #[test]
    fn test_fuel_efficiency() {
        let trips = vec![completed_trip(1000.0, 1150.0, "2026-03-04T10:00:00+00:00")];
        let records = vec![
            fuel(10.0, 60.0, "2026-03-04T10:00:00+00:00"),
            fuel(5.0, 30.0, "2026-03-04T12:00:00+00:00"),
        ];
        assert_eq!(fuel_efficiency(&trips, &records), 10.0);
    }

    #[test]
    fn test_rounding_only_at_the_boundary() {
        let records = vec![
            fuel(1.0, 0.1, "2026-03-04T10:00:00+00:00"),
            fuel(1.0, 0.2, "2026-03-04T10:00:00+00:00"),
        ];
        let cost = total_fuel_cost(&records);
        assert_ne!(cost, 0.3);
        assert_eq!(round_currency(cost), 0.3);
        assert_eq!(round_distance(149.96), 150.0);
        assert_eq!(round_distance(12.34), 12.3);
    }
}
