// src/ingest/providers/calendar.rs
// Rule-computed US macro calendar events: no scraping involved.
//
// Jobless Claims prints every Thursday 08:30 ET; NFP prints the first
// Friday of the month 08:30 ET. Release times are Eastern, so the UTC
// conversion carries the US DST rule (second Sunday of March through the
// first Sunday of November).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};

use crate::event::{Event, Impact};
use crate::ingest::types::SourceProvider;

const SOURCE: &str = "Rule";
const RELEASE_HOUR: u32 = 8;
const RELEASE_MINUTE: u32 = 30;

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 + i64::from(weekday.num_days_from_monday())
        - i64::from(first.weekday().num_days_from_monday()))
        % 7;
    let date = first.checked_add_signed(Duration::days(offset + 7 * (i64::from(n) - 1)))?;
    (date.month() == month).then_some(date)
}

/// US Eastern DST by date: [second Sunday of March, first Sunday of November).
pub fn is_eastern_dst(date: NaiveDate) -> bool {
    match (
        nth_weekday(date.year(), 3, Weekday::Sun, 2),
        nth_weekday(date.year(), 11, Weekday::Sun, 1),
    ) {
        (Some(start), Some(end)) => date >= start && date < end,
        _ => false,
    }
}

fn eastern_to_utc(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let offset_hours = if is_eastern_dst(date) { -4 } else { -5 };
    let offset = FixedOffset::east_opt(offset_hours * 3600)?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// First Friday of the month, 08:30 ET, as UTC.
pub fn first_friday(year: i32, month: u32) -> Option<DateTime<Utc>> {
    nth_weekday(year, month, Weekday::Fri, 1)
        .and_then(|d| eastern_to_utc(d, RELEASE_HOUR, RELEASE_MINUTE))
}

fn jobless_claims(now: DateTime<Utc>, horizon_days: i64) -> Vec<Event> {
    let mut out = Vec::new();
    // Start one day back so a Thursday already in progress is considered;
    // the recency filter in `events_at` trims anything stale.
    let mut date = now.date_naive() - Duration::days(1);
    let end = now.date_naive() + Duration::days(horizon_days);
    while date.weekday() != Weekday::Thu {
        date += Duration::days(1);
    }
    while date <= end {
        if let Some(ts) = eastern_to_utc(date, RELEASE_HOUR, RELEASE_MINUTE) {
            out.push(Event::scheduled("Jobless Claims", ts, SOURCE, Impact::Medium));
        }
        date += Duration::days(7);
    }
    out
}

fn nfp(now: DateTime<Utc>, horizon_months: u32) -> Vec<Event> {
    let mut out = Vec::new();
    let today = now.date_naive();
    for i in 0..horizon_months {
        let m0 = today.month0() + i;
        let year = today.year() + (m0 / 12) as i32;
        let month = (m0 % 12) + 1;
        if let Some(ts) = first_friday(year, month) {
            out.push(Event::scheduled("NFP", ts, SOURCE, Impact::High));
        }
    }
    out
}

pub struct RuleCalendarProvider {
    horizon_days: i64,
}

impl RuleCalendarProvider {
    pub fn new(horizon_days: i64) -> Self {
        Self { horizon_days }
    }

    /// Deterministic event list for a given instant; drops releases more
    /// than an hour in the past.
    pub fn events_at(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut out = jobless_claims(now, self.horizon_days);
        out.extend(nfp(now, 2));
        out.retain(|ev| {
            ev.timestamp
                .map(|ts| ts > now - Duration::hours(1))
                .unwrap_or(false)
        });
        out
    }
}

impl Default for RuleCalendarProvider {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl SourceProvider for RuleCalendarProvider {
    async fn fetch_latest(&self) -> Result<Vec<Event>> {
        Ok(self.events_at(Utc::now()))
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
