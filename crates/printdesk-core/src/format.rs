// Display formatting for backend timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use tracing::warn;

/// America/Santo_Domingo: UTC-04:00 all year, no DST.
const DISPLAY_OFFSET_SECS: i32 = -4 * 3600;

fn display_zone() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Render `DD/MM/YYYY H:MM AM/PM` in the display zone.
pub fn format_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&display_zone())
        .format("%d/%m/%Y %-I:%M %p")
        .to_string()
}

/// Format an ISO-8601 timestamp for display.
///
/// Missing or empty input yields `N/A`. Input that does not parse yields
/// `Error (<first 19 chars>)`. Timestamps without an offset are read as UTC.
pub fn format_timestamp(iso: Option<&str>) -> String {
    let Some(raw) = iso.filter(|s| !s.is_empty()) else {
        return "N/A".into();
    };

    match parse_timestamp(raw) {
        Some(at) => format_datetime(&at),
        None => {
            warn!(input = raw, "unparseable timestamp");
            let head: String = raw.chars().take(19).collect();
            format!("Error ({head})")
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input() {
        assert_eq!(format_timestamp(None), "N/A");
        assert_eq!(format_timestamp(Some("")), "N/A");
    }

    #[test]
    fn utc_is_shifted_four_hours() {
        assert_eq!(
            format_timestamp(Some("2025-11-30T21:50:00.000Z")),
            "30/11/2025 5:50 PM"
        );
    }

    #[test]
    fn morning_and_midnight() {
        assert_eq!(format_timestamp(Some("2025-01-05T13:07:00Z")), "05/01/2025 9:07 AM");
        assert_eq!(format_timestamp(Some("2025-01-05T04:00:00Z")), "05/01/2025 12:00 AM");
    }

    #[test]
    fn offset_and_naive_inputs() {
        assert_eq!(
            format_timestamp(Some("2025-06-01T08:30:00-04:00")),
            "01/06/2025 8:30 AM"
        );
        assert_eq!(format_timestamp(Some("2025-06-01T12:30:00")), "01/06/2025 8:30 AM");
        assert_eq!(format_timestamp(Some("2025-06-02")), "01/06/2025 8:00 PM");
    }

    #[test]
    fn garbage_is_truncated() {
        assert_eq!(
            format_timestamp(Some("2025-13-45T99:99:99Z trailing")),
            "Error (2025-13-45T99:99:99)"
        );
        assert_eq!(format_timestamp(Some("soon")), "Error (soon)");
    }
}
