//! Display formatting shared by every report layout.
//!
//! All dates shown on a report use the Thai Buddhist era (Gregorian year + 543)
//! in `dd/MM/yyyy` form. The store persists "no date" as a sentinel day
//! (`1900-01-01` or `0001-01-01`) and "no time" as `00:00:00`; both render as
//! an empty string.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub const BUDDHIST_ERA_OFFSET: i32 = 543;

const UNSET_TIME: &str = "00:00:00";

/// True for the sentinel days the store uses in place of NULL.
pub fn is_unset_date(date: NaiveDate) -> bool {
    matches!(
        (date.year(), date.month(), date.day()),
        (1900, 1, 1) | (1, 1, 1)
    )
}

/// `2024-03-15` becomes `15/03/2567`; sentinel or missing dates become `""`.
pub fn thai_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) if !is_unset_date(date) => format!(
            "{:02}/{:02}/{}",
            date.day(),
            date.month(),
            date.year() + BUDDHIST_ERA_OFFSET
        ),
        _ => String::new(),
    }
}

pub fn thai_date_of(timestamp: Option<NaiveDateTime>) -> String {
    thai_date(timestamp.map(|ts| ts.date()))
}

pub fn display_time(time: Option<&str>) -> String {
    match time.map(str::trim) {
        Some(t) if !t.is_empty() && t != UNSET_TIME => t.to_string(),
        _ => String::new(),
    }
}

/// Date followed by time of day. An unset date suppresses the time as well.
pub fn thai_date_time(timestamp: Option<NaiveDateTime>, time: Option<&str>) -> String {
    let date = thai_date_of(timestamp);
    if date.is_empty() {
        return date;
    }
    let time = display_time(time);
    if time.is_empty() {
        date
    } else {
        format!("{} {}", date, time)
    }
}

/// Joins name parts with single spaces, dropping blank parts.
pub fn join_words<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
