//! iCalendar (RFC 5545) rendering of a single validated event.

mod escape;
mod fold;

pub use escape::escape_text;
pub use fold::fold_line;

use crate::error::SerializeError;
use crate::event::validate::{has_control, is_ical_duration};
use crate::event::{Alarm, EventRecord, Trigger};
use crate::utils::time::format_ical_utc;
use tracing::error;

/// Product identifier written into every calendar
pub const PRODID: &str = concat!("-//scec//scec ", env!("CARGO_PKG_VERSION"), "//EN");

/// Serialize one event into a complete calendar document
///
/// Output is deterministic and uses CRLF line endings. Property order inside
/// the event is UID, DTSTAMP, DTSTART, DTEND, SUMMARY, DESCRIPTION, LOCATION,
/// ATTENDEE, followed by alarms. Empty optional fields are left out.
pub fn serialize(record: &EventRecord) -> Result<String, SerializeError> {
    check_preconditions(record).map_err(|e| {
        error!("Refusing to serialize invalid event {:?}: {}", record.uid, e);
        e
    })?;

    let mut doc = String::new();
    push_line(&mut doc, "BEGIN", "VCALENDAR");
    push_line(&mut doc, "VERSION", "2.0");
    push_line(&mut doc, "PRODID", PRODID);
    push_event(&mut doc, record);
    push_line(&mut doc, "END", "VCALENDAR");

    Ok(doc)
}

fn check_preconditions(record: &EventRecord) -> Result<(), SerializeError> {
    if record.uid.trim().is_empty() {
        return Err(SerializeError::PreconditionViolation(
            "UID is empty".to_string(),
        ));
    }
    if record.summary.trim().is_empty() {
        return Err(SerializeError::PreconditionViolation(
            "SUMMARY is empty".to_string(),
        ));
    }
    if record.start > record.end {
        return Err(SerializeError::PreconditionViolation(format!(
            "DTSTART {} is after DTEND {}",
            record.start, record.end
        )));
    }
    // Values written without escaping must stay on one content line
    if record.attendees.iter().any(|a| has_control(a)) {
        return Err(SerializeError::PreconditionViolation(
            "ATTENDEE contains control characters".to_string(),
        ));
    }
    for alarm in &record.alarms {
        if alarm.action.trim().is_empty() || has_control(&alarm.action) {
            return Err(SerializeError::PreconditionViolation(format!(
                "invalid alarm ACTION {:?}",
                alarm.action
            )));
        }
        if let Trigger::Relative(duration) = &alarm.trigger {
            if !is_ical_duration(duration) {
                return Err(SerializeError::PreconditionViolation(format!(
                    "invalid alarm TRIGGER {:?}",
                    duration
                )));
            }
        }
    }
    Ok(())
}

fn push_event(doc: &mut String, record: &EventRecord) {
    push_line(doc, "BEGIN", "VEVENT");
    push_line(doc, "UID", &escape_text(record.uid()));
    if let Some(created) = record.created() {
        push_line(doc, "DTSTAMP", &format_ical_utc(&created));
    }
    push_line(doc, "DTSTART", &format_ical_utc(&record.start()));
    push_line(doc, "DTEND", &format_ical_utc(&record.end()));
    push_line(doc, "SUMMARY", &escape_text(record.summary()));
    if !record.description().is_empty() {
        push_line(doc, "DESCRIPTION", &escape_text(record.description()));
    }
    if !record.location().is_empty() {
        push_line(doc, "LOCATION", &escape_text(record.location()));
    }
    for attendee in record.attendees() {
        push_line(doc, "ATTENDEE", &format!("mailto:{}", attendee));
    }
    for alarm in record.alarms() {
        push_alarm(doc, alarm);
    }
    push_line(doc, "END", "VEVENT");
}

fn push_alarm(doc: &mut String, alarm: &Alarm) {
    push_line(doc, "BEGIN", "VALARM");
    push_line(doc, "ACTION", &alarm.action);
    match &alarm.trigger {
        Trigger::Relative(duration) => push_line(doc, "TRIGGER", duration),
        Trigger::Absolute(at) => push_line(doc, "TRIGGER;VALUE=DATE-TIME", &format_ical_utc(at)),
    }
    if !alarm.description.is_empty() {
        push_line(doc, "DESCRIPTION", &escape_text(&alarm.description));
    }
    push_line(doc, "END", "VALARM");
}

fn push_line(doc: &mut String, name: &str, value: &str) {
    doc.push_str(&fold_line(&format!("{}:{}", name, value)));
}
