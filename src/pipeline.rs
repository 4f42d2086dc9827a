use crate::error::{PipelineError, SerializeError};
use crate::event::EventRecord;
use crate::extractor::Extractor;
use crate::ics;
use crate::llm::CompletionModel;
use chrono::{DateTime, Utc};
use tracing::info;

/// Text in, calendar document out
pub struct Pipeline<M> {
    extractor: Extractor<M>,
}

impl<M: CompletionModel> Pipeline<M> {
    pub fn new(extractor: Extractor<M>) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &Extractor<M> {
        &self.extractor
    }

    /// Extract an event from `text`
    pub async fn extract(
        &self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<EventRecord, PipelineError> {
        Ok(self.extractor.extract(text, timestamp).await?)
    }

    /// Render a validated event
    pub fn serialize(&self, record: &EventRecord) -> Result<String, SerializeError> {
        ics::serialize(record)
    }

    /// Extract an event from `text` and render it as an `.ics` document
    pub async fn generate_document(
        &self,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<String, PipelineError> {
        let record = self.extract(text, timestamp).await?;
        let document = self.serialize(&record)?;
        info!("Generated calendar document ({} bytes)", document.len());
        Ok(document)
    }
}
