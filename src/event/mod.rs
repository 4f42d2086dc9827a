use crate::error::{schema_violation, ExtractionError};
use chrono::{DateTime, Utc};

pub mod models;
pub mod validate;

pub use models::{output_schema, RawEventDocument};
pub use validate::validate;

/// Validated calendar event
///
/// Built once per extraction and never changed afterwards; all instants are UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub(crate) uid: String,
    pub(crate) summary: String,
    pub(crate) description: String,
    pub(crate) location: String,
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
    pub(crate) created: Option<DateTime<Utc>>,
    pub(crate) attendees: Vec<String>,
    pub(crate) alarms: Vec<Alarm>,
}

impl EventRecord {
    /// Create a record with only the required fields set
    pub fn new(
        uid: impl Into<String>,
        summary: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ExtractionError> {
        let uid = uid.into();
        let summary = summary.into();

        if uid.trim().is_empty() {
            return Err(schema_violation("UID", "must not be empty"));
        }
        if summary.trim().is_empty() {
            return Err(schema_violation("SUMMARY", "must not be empty"));
        }
        if start > end {
            return Err(schema_violation(
                "DTEND",
                format!("end {} is before start {}", end, start),
            ));
        }

        Ok(Self {
            uid,
            summary,
            description: String::new(),
            location: String::new(),
            start,
            end,
            created: None,
            attendees: Vec::new(),
            alarms: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }

    pub fn with_alarms(mut self, alarms: Vec<Alarm>) -> Self {
        self.alarms = alarms;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Empty when the model gave no description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Empty when the model gave no location
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// DTSTAMP of the event
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn attendees(&self) -> &[String] {
        &self.attendees
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }
}

/// When an alarm fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// ISO-8601 duration relative to the event start, e.g. `-PT15M`
    Relative(String),
    /// Fixed instant
    Absolute(DateTime<Utc>),
}

/// Reminder nested inside the event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub action: String,
    pub trigger: Trigger,
    /// Omitted from the document when empty
    pub description: String,
}

impl Alarm {
    /// Display alarm with no text
    pub fn display(trigger: Trigger) -> Self {
        Self {
            action: "DISPLAY".to_string(),
            trigger,
            description: String::new(),
        }
    }
}
