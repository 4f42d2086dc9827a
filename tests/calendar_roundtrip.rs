mod support;

use chrono::{DateTime, TimeZone, Utc};
use scec::event::{Alarm, Trigger};
use scec::ics::serialize;
use scec::EventRecord;
use support::{parse_event, property};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 11, h, m, 0).unwrap()
}

fn lunch() -> EventRecord {
    EventRecord::new("lunch-1@scec", "Lunch with Sam", at(12, 0), at(13, 0)).unwrap()
}

/// Only the required fields survive a parse by an independent reader
#[test]
fn test_required_fields_round_trip() {
    let record = lunch();
    let event = parse_event(&serialize(&record).unwrap());

    assert_eq!(property(&event.properties, "UID"), Some(record.uid()));
    assert_eq!(property(&event.properties, "SUMMARY"), Some(record.summary()));
    assert_eq!(property(&event.properties, "DTSTART"), Some("20250611T120000Z"));
    assert_eq!(property(&event.properties, "DTEND"), Some("20250611T130000Z"));
    assert_eq!(property(&event.properties, "DESCRIPTION"), None);
    assert_eq!(property(&event.properties, "LOCATION"), None);
}

#[test]
fn test_folded_lines_unfold() {
    let description = "x".repeat(200);
    let record = lunch().with_description(description.clone());
    let document = serialize(&record).unwrap();
    assert!(document.contains("\r\n "));

    let event = parse_event(&document);
    assert_eq!(
        property(&event.properties, "DESCRIPTION"),
        Some(description.as_str())
    );
}

#[test]
fn test_escaped_text_stays_in_one_property() {
    let record = lunch()
        .with_location("Room 4, floor 2; east wing")
        .with_description("Agenda:\nbudget");
    let event = parse_event(&serialize(&record).unwrap());

    let location = property(&event.properties, "LOCATION").unwrap();
    assert!(location.starts_with("Room 4"));
    assert!(location.ends_with("east wing"));

    let description = property(&event.properties, "DESCRIPTION").unwrap();
    assert!(description.starts_with("Agenda:"));
    assert!(description.ends_with("budget"));
    assert_eq!(property(&event.properties, "SUMMARY"), Some("Lunch with Sam"));
}

#[test]
fn test_alarms_parse_as_nested_components() {
    let record = lunch()
        .with_attendees(vec!["sam@example.com".to_string()])
        .with_alarms(vec![
            Alarm {
                description: "Leave now".to_string(),
                ..Alarm::display(Trigger::Relative("-PT15M".to_string()))
            },
            Alarm::display(Trigger::Absolute(at(11, 0))),
        ]);
    let event = parse_event(&serialize(&record).unwrap());

    assert_eq!(
        property(&event.properties, "ATTENDEE"),
        Some("mailto:sam@example.com")
    );
    assert_eq!(event.alarms.len(), 2);

    let first = &event.alarms[0].properties;
    assert_eq!(property(first, "ACTION"), Some("DISPLAY"));
    assert_eq!(property(first, "TRIGGER"), Some("-PT15M"));
    assert_eq!(property(first, "DESCRIPTION"), Some("Leave now"));

    let second = &event.alarms[1].properties;
    assert_eq!(property(second, "TRIGGER"), Some("20250611T110000Z"));
    let params = second
        .iter()
        .find(|p| p.name == "TRIGGER")
        .and_then(|p| p.params.clone())
        .unwrap_or_default();
    assert!(params
        .iter()
        .any(|(name, values)| name == "VALUE" && values.iter().any(|v| v == "DATE-TIME")));
}
