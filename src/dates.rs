//! Best-effort timestamp handling for sheet rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Formats tried after the sheet's native `M/D/YYYY` style.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses `M/D/YYYY` with an optional `H:MM[:SS]` time part.
fn parse_slash_format(s: &str) -> Option<NaiveDateTime> {
    let mut parts = s.splitn(2, ' ');
    let date_part = parts.next()?;
    let time_part = parts.next().map(str::trim);

    let date = NaiveDate::parse_from_str(date_part, "%m/%d/%Y").ok()?;
    let time = match time_part {
        None | Some("") => NaiveTime::MIN,
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
            .ok()?,
    };
    Some(date.and_time(time))
}

/// Parses a sheet timestamp, returning `None` when no known format fits.
///
/// Offsets in RFC 3339 input are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.contains('/') {
        if let Some(dt) = parse_slash_format(s) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// `DD-MM-YYYY`, or `N/A` when the timestamp is missing.
pub fn display_date(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// `YYYY-MM` bucket key.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// `Aug 2024` style label.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}
