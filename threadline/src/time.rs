//! Relative timestamps for display

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::wire::JUST_NOW;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Render a server timestamp relative to `now`, e.g. `5 mins ago`
///
/// Text the server already rendered (`3 hours ago`, `Just now`) and text
/// that is not a timestamp at all are returned unchanged. Timestamps without
/// an offset are taken to be UTC. Anything older than 30 days is shown as a
/// plain date.
pub fn format_time_ago(raw: &str, now: DateTime<Utc>) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if raw.contains("ago") || raw.contains(JUST_NOW) {
        return raw.to_string();
    }

    let date = match parse(raw.trim()) {
        Some(date) => date,
        None => return raw.to_string(),
    };

    let elapsed = now.signed_duration_since(date);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        JUST_NOW.to_string()
    } else if mins < 60 {
        ago(mins, "min")
    } else if hours < 24 {
        ago(hours, "hour")
    } else if days < 30 {
        ago(days, "day")
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

fn ago(n: i64, unit: &str) -> String {
    let plural = if n > 1 { "s" } else { "" };
    format!("{} {}{} ago", n, unit, plural)
}

fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}
