use crate::error::{schema_violation, ExtractionError};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level JSON document the model is asked to produce
///
/// Property values are kept as raw JSON so that a value of the wrong type is
/// reported against its own key during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawEventDocument {
    /// iCalendar event properties keyed by their property names
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: RawEventProperties,
    /// Reminders attached to the event
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alarms: Vec<RawAlarm>,
}

/// Event properties exactly as the model wrote them
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawEventProperties {
    /// Unique identifier of the event
    #[serde(rename = "UID", alias = "uid", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub uid: Option<Value>,
    /// Creation time, ISO-8601
    #[serde(rename = "DTSTAMP", alias = "dtstamp", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub dtstamp: Option<Value>,
    /// Start time, ISO-8601
    #[serde(rename = "DTSTART", alias = "dtstart", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub dtstart: Option<Value>,
    /// End time, ISO-8601
    #[serde(rename = "DTEND", alias = "dtend", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub dtend: Option<Value>,
    /// Short event title
    #[serde(rename = "SUMMARY", alias = "summary", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub summary: Option<Value>,
    /// Longer free-text description
    #[serde(
        rename = "DESCRIPTION",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub description: Option<Value>,
    /// Where the event takes place
    #[serde(rename = "LOCATION", alias = "location", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub location: Option<Value>,
    /// E-mail addresses of attendees
    #[serde(rename = "ATTENDEE", alias = "attendee", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<AttendeeField>")]
    pub attendee: Option<Value>,
}

/// Attendees come either as one separated string or as a list
#[derive(Debug, Clone, JsonSchema)]
#[serde(untagged)]
pub enum AttendeeField {
    One(String),
    Many(Vec<String>),
}

/// One reminder as the model wrote it
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawAlarm {
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: RawAlarmProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawAlarmProperties {
    /// Alarm action, DISPLAY when omitted
    #[serde(rename = "ACTION", alias = "action", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub action: Option<Value>,
    /// ISO-8601 duration relative to the start (e.g. -PT15M) or an absolute time
    #[serde(rename = "TRIGGER", alias = "trigger", default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub trigger: Option<Value>,
    /// Text shown when the alarm fires
    #[serde(
        rename = "DESCRIPTION",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub description: Option<Value>,
}

/// `null` reads the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawEventDocument {
    /// Read the document from a parsed JSON value
    ///
    /// Containers of the wrong kind fail with a schema violation naming the
    /// container; leaf values are type-checked later by validation.
    pub fn from_value(value: Value) -> Result<Self, ExtractionError> {
        check_shape(&value)?;
        serde_json::from_value(value).map_err(|e| schema_violation("properties", e.to_string()))
    }
}

fn check_shape(value: &Value) -> Result<(), ExtractionError> {
    let doc = value
        .as_object()
        .ok_or_else(|| schema_violation("properties", "top level is not an object"))?;

    expect_object("properties", doc.get("properties"))?;

    match doc.get("alarms") {
        None | Some(Value::Null) => {}
        Some(Value::Array(alarms)) => {
            for alarm in alarms {
                let alarm = alarm
                    .as_object()
                    .ok_or_else(|| schema_violation("ALARM", "alarm is not an object"))?;
                expect_object("ALARM", alarm.get("properties"))?;
            }
        }
        Some(other) => {
            return Err(schema_violation(
                "alarms",
                format!("expected an array, got {}", json_kind(other)),
            ))
        }
    }
    Ok(())
}

fn expect_object(field: &str, value: Option<&Value>) -> Result<(), ExtractionError> {
    match value {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(schema_violation(
            field,
            format!("expected an object, got {}", json_kind(other)),
        )),
    }
}

/// Short name of a JSON value's type for messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// JSON Schema of [`RawEventDocument`], used for schema-constrained decoding
pub fn output_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(RawEventDocument);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}
