use crate::error::ExtractionError;
use crate::event::{output_schema, validate, EventRecord, RawEventDocument};
use crate::llm::prompt::render_event_prompt;
use crate::llm::CompletionModel;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{from_str, Value};
use tracing::{error, info, warn};

/// Turns free-form text into a validated [`EventRecord`] with a language model
pub struct Extractor<M> {
    model: M,
    timezone: Tz,
    schema: Value,
}

impl<M: CompletionModel> Extractor<M> {
    /// Create an extractor; `timezone` anchors times the model gives without an offset
    pub fn new(model: M, timezone: Tz) -> Self {
        Self {
            model,
            timezone,
            schema: output_schema(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Extract one event from `user_text`
    ///
    /// `request_timestamp` is handed to the model to resolve relative dates and
    /// becomes DTSTAMP when the model leaves it out. The model is called exactly
    /// once; nothing is returned unless the whole record validates.
    pub async fn extract(
        &self,
        user_text: &str,
        request_timestamp: DateTime<Utc>,
    ) -> Result<EventRecord, ExtractionError> {
        info!("Extracting event with model {}", self.model.name());

        let prompt = render_event_prompt(user_text, request_timestamp, &self.schema);

        let output = self
            .model
            .complete(&prompt, &self.schema)
            .await
            .map_err(|e| {
                error!("Model call failed: {}", e);
                ExtractionError::ModelUnavailable(e)
            })?;

        let raw = parse_model_output(&output)?;
        let record = validate(raw, request_timestamp, self.timezone).map_err(|e| {
            warn!("Model output failed validation: {}", e);
            e
        })?;

        info!("Extracted event '{}' ({})", record.summary(), record.uid());
        Ok(record)
    }
}

/// Parse model output into the raw event document
///
/// Clean JSON is tried first, then the span from the first `{` to the last
/// `}`, which drops markdown fences and stray prose around the object. Output
/// with no JSON object in it is malformed; a JSON object of the wrong shape is
/// a schema violation.
pub fn parse_model_output(output: &str) -> Result<RawEventDocument, ExtractionError> {
    let value = find_json_object(output).map_err(|e| {
        error!("Could not extract valid JSON from model output: {}", output);
        ExtractionError::MalformedOutput(e)
    })?;
    RawEventDocument::from_value(value)
}

fn find_json_object(output: &str) -> Result<Value, String> {
    let first_error = match from_str::<Value>(output.trim()) {
        Ok(value @ Value::Object(_)) => return Ok(value),
        Ok(_) => "expected a JSON object".to_string(),
        Err(e) => e.to_string(),
    };

    if let (Some(start), Some(end)) = (output.find('{'), output.rfind('}')) {
        if start < end {
            if let Ok(value @ Value::Object(_)) = from_str::<Value>(&output[start..=end]) {
                warn!("Model wrapped its JSON in extra text");
                return Ok(value);
            }
        }
    }

    Err(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_clean_json() {
        let doc = parse_model_output(r#"{"properties": {"SUMMARY": "Standup"}}"#).unwrap();
        assert_eq!(doc.properties.summary, Some(json!("Standup")));
    }

    #[test]
    fn test_parse_fenced_json() {
        let output = "Here is the event:\n```json\n{\"properties\": {\"SUMMARY\": \"Standup\"}}\n```";
        let doc = parse_model_output(output).unwrap();
        assert_eq!(doc.properties.summary, Some(json!("Standup")));
    }

    #[test]
    fn test_parse_garbage() {
        for output in ["", "I could not find an event.", "{not json}", "[1, 2]", "} {", "42"] {
            let err = parse_model_output(output).unwrap_err();
            assert!(
                matches!(err, ExtractionError::MalformedOutput(_)),
                "{output:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_wrong_shape() {
        let err = parse_model_output(r#"{"properties": "Lunch"}"#).unwrap_err();
        assert_eq!(err.field(), Some("properties"));

        let err = parse_model_output(r#"{"properties": {}, "alarms": "soon"}"#).unwrap_err();
        assert_eq!(err.field(), Some("alarms"));
    }

    #[test]
    fn test_parse_null_alarms() {
        let doc = parse_model_output(r#"{"properties": {"SUMMARY": "Standup"}, "alarms": null}"#)
            .unwrap();
        assert!(doc.alarms.is_empty());
    }

    #[test]
    fn test_parse_keeps_wrong_leaf_types() {
        // Typed per key during validation so the error names the property
        let doc = parse_model_output(r#"{"properties": {"DTSTART": 20250611}}"#).unwrap();
        assert_eq!(doc.properties.dtstart, Some(json!(20250611)));
    }

    #[test]
    fn test_parse_empty_object() {
        // Shape is fine, missing fields are a validation concern
        let doc = parse_model_output("{}").unwrap();
        assert!(doc.properties.summary.is_none());
    }
}
