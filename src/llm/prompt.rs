use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Instructions for turning free-form text into event JSON
pub const EVENT_PROMPT_TEMPLATE: &str = "You are an assistant that converts free-form text into a JSON representation of an iCalendar VEVENT.
Your output must be a single JSON object where:
- The top-level keys are `properties` and optionally `alarms`.
- `properties` only uses these keys: UID, DTSTAMP, DTSTART, DTEND, SUMMARY, DESCRIPTION, LOCATION, ATTENDEE. Every value is a flat string, except ATTENDEE which may be a list of e-mail addresses.
- `alarms` (if present) is an array of objects, each having a `properties` object with the keys ACTION, TRIGGER and DESCRIPTION. TRIGGER is an ISO-8601 duration relative to the start (e.g. \"-PT15M\") or an ISO-8601 date/time.

Important rules:
1. Do not add keys other than the ones listed above.
2. Only fill in fields you have evidence for. If the text does not mention a property (e.g. a location), omit it.
3. Format all date/time fields as ISO-8601 strings (e.g. \"2025-12-31T09:00:00\"). Resolve relative dates such as \"tomorrow\" against the current timestamp.
4. Always include a unique `UID` and a `DTSTAMP`.
5. Do not include markdown or explanatory text, only the JSON object.

Below is the user's text and the current timestamp.
Use the text to infer the event details (start time, end time, summary, location) and produce the JSON.

User text: {user_text}
Current timestamp: {timestamp}

The output must conform to this JSON Schema:
{format_instructions}";

/// Fill the template with the request data
pub fn render_event_prompt(user_text: &str, timestamp: DateTime<Utc>, schema: &Value) -> String {
    let format_instructions =
        serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());

    // Placeholders are substituted last-to-first so user text containing a
    // placeholder name is never expanded.
    EVENT_PROMPT_TEMPLATE
        .replace("{format_instructions}", &format_instructions)
        .replace(
            "{timestamp}",
            &timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
        .replace("{user_text}", user_text)
}
