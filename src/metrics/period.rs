use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entities::{fuel_record, service_order, trip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Inclusive window `[start, end]` in the reference instant's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodBounds {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl PeriodBounds {
    pub fn contains(&self, at: &DateTime<FixedOffset>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

/// The instant a record is filed under when reports are cut by period.
pub trait Timestamped {
    fn timestamp(&self) -> Option<DateTime<FixedOffset>>;
}

impl Timestamped for trip::Model {
    // Trips count when they finish; running trips are not reportable yet.
    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.end_time
    }
}

impl Timestamped for fuel_record::Model {
    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        Some(self.date)
    }
}

impl Timestamped for service_order::Model {
    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        Some(self.created_at)
    }
}

fn local_datetime(naive: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// Weeks start on Monday. Monthly windows run from the 1st to the last day.
pub fn period_bounds(period: Period, reference: DateTime<FixedOffset>) -> PeriodBounds {
    let offset = *reference.offset();
    let today = reference.date_naive();

    let (first, last) = match period {
        Period::Daily => (today, today),
        Period::Weekly => {
            let monday =
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            (monday, monday + Duration::days(6))
        }
        Period::Monthly => {
            let first = today - Duration::days(i64::from(today.day0()));
            (first, last_day_of_month(today))
        }
    };

    let start = local_datetime(first.and_time(NaiveTime::default()), offset);
    let after_last = local_datetime((last + Duration::days(1)).and_time(NaiveTime::default()), offset);

    PeriodBounds {
        start,
        end: after_last - Duration::nanoseconds(1),
    }
}

/// Records whose timestamp falls inside the period around `reference`, order preserved.
pub fn filter_by_period<T>(entities: &[T], period: Period, reference: DateTime<FixedOffset>) -> Vec<T>
where
    T: Timestamped + Clone,
{
    let bounds = period_bounds(period, reference);
    entities
        .iter()
        .filter(|e| e.timestamp().is_some_and(|at| bounds.contains(&at)))
        .cloned()
        .collect()
}
