use super::CompletionModel;
use crate::config::ModelConfig;
use crate::error::{config_error, AppResult, ModelError};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Path of the non-chat completion endpoint, relative to the service root
const GENERATE_PATH: &str = "api/generate";

/// Request body for `/api/generate`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    /// JSON Schema for structured outputs
    format: &'a Value,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Reply of a non-streaming generate call
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a locally hosted Ollama service
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    generate_url: Url,
    model: String,
    temperature: f32,
    timeout_ms: u64,
}

impl OllamaClient {
    /// Create a client from explicit model settings
    pub fn new(config: &ModelConfig) -> AppResult<Self> {
        let mut base = Url::parse(&config.endpoint_url).map_err(|e| {
            config_error(&format!(
                "Invalid model endpoint URL '{}': {}",
                config.endpoint_url, e
            ))
        })?;
        // Keep any path prefix of the base URL when joining
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let generate_url = base
            .join(GENERATE_PATH)
            .map_err(|e| config_error(&format!("Invalid model endpoint URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| config_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            generate_url,
            model: config.model_name.clone(),
            temperature: config.temperature,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Full URL the client posts to
    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            ModelError::Unreachable {
                endpoint: self.generate_url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl CompletionModel for OllamaClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, schema: &Value) -> Result<String, ModelError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: schema,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        info!("Requesting completion from {} at {}", self.model, self.generate_url);
        debug!("Prompt length: {} bytes", prompt.len());

        let res = self
            .client
            .post(self.generate_url.clone())
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let text = res.text().await.map_err(|e| self.map_transport_error(e))?;
        let reply: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        debug!("Received {} bytes of model output", reply.response.len());
        Ok(reply.response)
    }
}
