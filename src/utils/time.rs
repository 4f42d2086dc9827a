use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::Duration;

/// Offset-carrying layouts that RFC 3339 parsing does not cover
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Layouts without an offset; `%.f` also matches a missing fraction
const FLOATING_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse a timestamp as emitted by the model into a UTC instant
///
/// Explicit offsets and a trailing `Z` are honoured. Times without an offset
/// are read as wall-clock time in `tz`. A bare date means midnight.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("empty timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    // Zulu suffix on layouts RFC 3339 rejects, e.g. compact `20250611T120000Z`
    if let Some(rest) = s.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return parse_naive(rest)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| format!("unrecognised timestamp '{}'", raw));
    }

    let naive = parse_naive(s).ok_or_else(|| format!("unrecognised timestamp '{}'", raw))?;
    localize(&naive, tz)
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    for format in FLOATING_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Resolve a wall-clock time in `tz` to an instant
fn localize(naive: &NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, String> {
    match tz.from_local_datetime(naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Repeated hour at the end of DST, take the first occurrence
        chrono::LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        chrono::LocalResult::None => Err(format!("{} does not exist in {}", naive, tz)),
    }
}

/// Render an instant in the iCalendar UTC form `YYYYMMDDTHHMMSSZ`
pub fn format_ical_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Delay before retry number `attempt` (1-based), doubling from `base_ms`
pub fn retry_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor))
}
