use crate::error::ModelError;
use async_trait::async_trait;
use serde_json::Value;

pub mod ollama;
pub mod prompt;

pub use ollama::OllamaClient;

/// A text completion capability the extractor can ask for event JSON
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Complete `prompt`, steering the output towards `schema` if supported
    async fn complete(&self, prompt: &str, schema: &Value) -> Result<String, ModelError>;
}
