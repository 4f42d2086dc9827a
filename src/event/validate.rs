use super::models::{json_kind, RawAlarm, RawEventDocument};
use super::{Alarm, EventRecord, Trigger};
use crate::error::{schema_violation, ExtractionError};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, warn};

/// Turn the model's raw document into a validated [`EventRecord`]
///
/// Every key is checked or defaulted exactly once here. A missing UID is
/// generated and a missing DTSTAMP becomes `request_timestamp`; anything else
/// that is missing, of the wrong type or unparseable fails with the property
/// name.
pub fn validate(
    raw: RawEventDocument,
    request_timestamp: DateTime<Utc>,
    tz: Tz,
) -> Result<EventRecord, ExtractionError> {
    let props = raw.properties;

    let summary = text("SUMMARY", props.summary)?;
    let dtstart = text("DTSTART", props.dtstart)?;
    let dtend = text("DTEND", props.dtend)?;
    let dtstamp = text("DTSTAMP", props.dtstamp)?;
    let uid = text("UID", props.uid)?;
    let description = text("DESCRIPTION", props.description)?;
    let location = text("LOCATION", props.location)?;

    let summary = non_blank(summary)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| schema_violation("SUMMARY", "missing or empty"))?;
    let start = required_time("DTSTART", dtstart, tz)?;
    let end = required_time("DTEND", dtend, tz)?;
    if start > end {
        return Err(schema_violation(
            "DTEND",
            format!("end {} is before start {}", end, start),
        ));
    }

    let created = match non_blank(dtstamp) {
        Some(raw) => parse_timestamp(&raw, tz).map_err(|e| schema_violation("DTSTAMP", e))?,
        None => {
            debug!("Model omitted DTSTAMP, using request time");
            request_timestamp
        }
    };

    let uid = match non_blank(uid) {
        Some(uid) => uid.trim().to_string(),
        None => {
            let uid = uuid::Uuid::new_v4().to_string();
            warn!("Model omitted UID, generated {}", uid);
            uid
        }
    };

    let attendees = match props.attendee {
        Some(value) => split_attendees(value)?,
        None => Vec::new(),
    };

    let alarms = raw
        .alarms
        .into_iter()
        .map(|alarm| validate_alarm(alarm, tz))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EventRecord::new(uid, summary, start, end)?
        .with_description(non_blank(description).unwrap_or_default())
        .with_location(non_blank(location).unwrap_or_default())
        .with_created(created)
        .with_attendees(attendees)
        .with_alarms(alarms))
}

/// Property value as a string; `null` counts as absent
fn text(field: &str, value: Option<Value>) -> Result<Option<String>, ExtractionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(schema_violation(
            field,
            format!("expected a string, got {}", json_kind(&other)),
        )),
    }
}

/// Drop values that are only whitespace, keeping the rest untouched
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_time(
    field: &str,
    value: Option<String>,
    tz: Tz,
) -> Result<DateTime<Utc>, ExtractionError> {
    let raw = non_blank(value).ok_or_else(|| schema_violation(field, "missing or empty"))?;
    parse_timestamp(&raw, tz).map_err(|e| schema_violation(field, e))
}

/// Flatten attendee input into bare addresses
///
/// Accepts one string separated by `,` or `;`, or a list of strings.
fn split_attendees(value: Value) -> Result<Vec<String>, ExtractionError> {
    let entries = match value {
        Value::Null => Vec::new(),
        Value::String(list) => list
            .split(|c: char| c == ',' || c == ';')
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(schema_violation(
                    "ATTENDEE",
                    format!("expected a string entry, got {}", json_kind(&other)),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(schema_violation(
                "ATTENDEE",
                format!("expected a string or a list, got {}", json_kind(&other)),
            ))
        }
    };

    let mut attendees = Vec::with_capacity(entries.len());
    for entry in entries {
        let address = strip_mailto(entry.trim());
        if address.is_empty() {
            continue;
        }
        if has_control(address) {
            return Err(schema_violation(
                "ATTENDEE",
                "address contains control characters",
            ));
        }
        attendees.push(address.to_string());
    }
    Ok(attendees)
}

fn strip_mailto(entry: &str) -> &str {
    match entry.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("mailto:") => entry[7..].trim(),
        _ => entry,
    }
}

/// Line breaks and other control characters would start new content lines
pub(crate) fn has_control(value: &str) -> bool {
    value.chars().any(char::is_control)
}

fn validate_alarm(alarm: RawAlarm, tz: Tz) -> Result<Alarm, ExtractionError> {
    let props = alarm.properties;

    let raw_trigger = non_blank(text("ALARM.TRIGGER", props.trigger)?)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| schema_violation("ALARM.TRIGGER", "missing or empty"))?;
    let trigger = if is_ical_duration(&raw_trigger) {
        Trigger::Relative(raw_trigger.to_ascii_uppercase())
    } else {
        let at = parse_timestamp(&raw_trigger, tz).map_err(|_| {
            schema_violation(
                "ALARM.TRIGGER",
                format!("'{}' is neither a duration nor a timestamp", raw_trigger),
            )
        })?;
        Trigger::Absolute(at)
    };

    let action = match non_blank(text("ALARM.ACTION", props.action)?) {
        Some(action) => {
            let action = action.trim().to_ascii_uppercase();
            if has_control(&action) {
                return Err(schema_violation(
                    "ALARM.ACTION",
                    "action contains control characters",
                ));
            }
            action
        }
        None => "DISPLAY".to_string(),
    };

    Ok(Alarm {
        action,
        trigger,
        description: non_blank(text("ALARM.DESCRIPTION", props.description)?)
            .unwrap_or_default(),
    })
}

/// Check the RFC 5545 duration grammar: `[+-]P(nW | nD[T..] | T..)`
pub fn is_ical_duration(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    let rest = upper.trim_start_matches(|c: char| c == '+' || c == '-');
    if upper.len() - rest.len() > 1 {
        return false;
    }
    let Some(rest) = rest.strip_prefix('P') else {
        return false;
    };

    if let Some(weeks) = rest.strip_suffix('W') {
        return !weeks.is_empty() && weeks.bytes().all(|b| b.is_ascii_digit());
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    if !date_part.is_empty() {
        let Some(days) = date_part.strip_suffix('D') else {
            return false;
        };
        if days.is_empty() || !days.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    match time_part {
        Some(time) => is_time_components(time),
        None => !date_part.is_empty(),
    }
}

/// `nH`, `nM`, `nS` in that order, at least one present
fn is_time_components(mut time: &str) -> bool {
    let mut seen = false;
    for unit in ['H', 'M', 'S'] {
        let digits = time.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && time[digits..].starts_with(unit) {
            time = &time[digits + 1..];
            seen = true;
        }
    }
    seen && time.is_empty()
}
