//! Date grids for the calendar module.
//!
//! Pure functions over an anchor day: the Monday-starting week around it,
//! the 6×7 month grid around it, and per-day event buckets. Nothing here
//! knows about display caps; callers decide how many bucket entries to show.
//!
//! Unreadable date strings never fail: they resolve to today.

use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate};
use serde::Serialize;

use crate::items::CalendarEvent;
use crate::module::CalendarView;

/// Number of cells in a month grid (6 rows × 7 columns).
pub const MONTH_GRID_CELLS: usize = 42;

/// One cell of the month grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCell {
    pub date: NaiveDate,
    /// Day-of-month number shown in the cell.
    pub label: String,
    pub in_month: bool,
    pub is_today: bool,
}

/// Today in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a calendar day out of an ISO date, an ISO date-time (time part
/// ignored) or an RFC 3339 timestamp.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// [`parse_day`], falling back to today.
pub fn day_or_today(raw: &str) -> NaiveDate {
    parse_day(raw).unwrap_or_else(today)
}

/// Calendar-day equality ignoring time of day.
pub fn same_day(a: &str, b: &str) -> bool {
    day_or_today(a) == day_or_today(b)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The seven days, Monday → Sunday, of the week containing `date`.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = week_start(date);
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

/// The seven days, Monday → Sunday, of the week containing `anchor`.
pub fn week_dates(anchor: &str) -> [NaiveDate; 7] {
    week_of(day_or_today(anchor))
}

/// 42 contiguous cells covering the month of `anchor`, starting on the
/// Monday on or before the 1st.
pub fn month_cells(anchor: &str, today: NaiveDate) -> Vec<MonthCell> {
    month_grid(day_or_today(anchor), today)
}

pub fn month_grid(anchor: NaiveDate, today: NaiveDate) -> Vec<MonthCell> {
    let first = anchor.with_day(1).unwrap_or(anchor);
    let start = week_start(first);
    (0..MONTH_GRID_CELLS)
        .map(|offset| {
            let date = start + Duration::days(offset as i64);
            MonthCell {
                date,
                label: date.day().to_string(),
                in_month: date.month() == first.month() && date.year() == first.year(),
                is_today: date == today,
            }
        })
        .collect()
}

/// Events falling on `date`, in their original relative order.
pub fn bucket_events(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events.iter().filter(|event| event.date == date).collect()
}

/// Move the anchor by `steps` periods of `view` (day, week or month).
/// Month steps clamp the day to the target month's length.
pub fn shift_anchor(anchor: NaiveDate, view: CalendarView, steps: i32) -> NaiveDate {
    match view {
        CalendarView::Daily => anchor + Duration::days(i64::from(steps)),
        CalendarView::Weekly => anchor + Duration::weeks(i64::from(steps)),
        CalendarView::Monthly => {
            let months = Months::new(steps.unsigned_abs());
            let shifted = if steps >= 0 {
                anchor.checked_add_months(months)
            } else {
                anchor.checked_sub_months(months)
            };
            shifted.unwrap_or(anchor)
        }
    }
}
