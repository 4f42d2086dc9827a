#![allow(dead_code)]

use async_trait::async_trait;
use ical::parser::ical::component::{IcalCalendar, IcalEvent};
use ical::property::Property;
use ical::IcalParser;
use scec::error::ModelError;
use scec::llm::CompletionModel;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Model stand-in that plays back canned replies in order
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    /// Model that answers once with `reply`
    pub fn replying(reply: &str) -> Self {
        Self::default().then_reply(reply)
    }

    pub fn then_reply(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn then_fail(self, error: ModelError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str, _schema: &Value) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::InvalidResponse("script exhausted".to_string())))
    }
}

/// Connection refused, as when the model service is not running
pub fn refused() -> ModelError {
    ModelError::Unreachable {
        endpoint: "http://localhost:11434/api/generate".to_string(),
        message: "connection refused".to_string(),
    }
}

/// Parse a document with the `ical` reader, expecting exactly one calendar
pub fn parse_calendar(document: &str) -> IcalCalendar {
    let mut calendars = IcalParser::new(document.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(calendars.len(), 1, "expected one calendar");
    calendars.remove(0)
}

/// The single event of a one-event document
pub fn parse_event(document: &str) -> IcalEvent {
    let mut calendar = parse_calendar(document);
    assert_eq!(calendar.events.len(), 1, "expected one event");
    calendar.events.remove(0)
}

/// Value of the first property called `name`
pub fn property<'a>(properties: &'a [Property], name: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.value.as_deref())
}

/// Property names in document order
pub fn property_names(properties: &[Property]) -> Vec<&str> {
    properties.iter().map(|p| p.name.as_str()).collect()
}
