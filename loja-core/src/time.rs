use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

/// Inclusive calendar-day range parsed straight from the `de`/`ate` query
/// parameters. Both ends are optional; an empty range matches everything.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub de: Option<NaiveDate>,
    pub ate: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(de: Option<NaiveDate>, ate: Option<NaiveDate>) -> Self {
        Self { de, ate }
    }

    /// First instant of the range, UTC midnight of `de`.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.de
            .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
    }

    /// Exclusive upper bound: UTC midnight of the day after `ate`, so the
    /// whole last day is covered.
    pub fn end_exclusive(&self) -> Option<DateTime<Utc>> {
        self.ate
            .map(|d| Utc.from_utc_datetime(&(d + Days::new(1)).and_time(NaiveTime::MIN)))
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start().map_or(true, |s| ts >= s) && self.end_exclusive().map_or(true, |e| ts < e)
    }
}
