use crate::config::Config;
use crate::error::{config_error, AppResult, Error, PipelineError};
use crate::extractor::Extractor;
use crate::llm::{CompletionModel, OllamaClient};
use crate::pipeline::Pipeline;
use crate::utils::time::retry_delay;
use chrono::{DateTime, Utc};
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
///
/// Logs go to stderr so a document printed on stdout stays clean.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the configuration and apply command-line overrides
pub fn load_config(
    path: Option<&Path>,
    model: Option<String>,
    endpoint: Option<String>,
) -> miette::Result<Config> {
    let mut config = Config::load(path).map_err(|e| {
        error!("Failed to load configuration: {:?}", e);
        e
    })?;

    if let Some(model) = model {
        config.model.model_name = model;
    }
    if let Some(endpoint) = endpoint {
        config.model.endpoint_url = endpoint;
    }
    config.validate()?;

    info!(
        "Using model {} at {} (timezone {})",
        config.model.model_name, config.model.endpoint_url, config.timezone
    );
    Ok(config)
}

/// Build the Ollama-backed pipeline described by `config`
pub fn build_pipeline(config: &Config) -> AppResult<Pipeline<OllamaClient>> {
    let client = OllamaClient::new(&config.model)?;
    Ok(Pipeline::new(Extractor::new(client, config.tz()?)))
}

/// Event text from the arguments, or from stdin when there are none
pub fn read_input(args: &[String]) -> AppResult<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text.trim().to_string())
}

/// Parse the `--timestamp` override, defaulting to now
pub fn request_timestamp(raw: Option<&str>) -> AppResult<DateTime<Utc>> {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| config_error(&format!("Invalid timestamp '{}': {}", raw, e))),
        None => Ok(Utc::now()),
    }
}

/// Generate a document, retrying only while the model service is unavailable
pub async fn generate_with_retry<M: CompletionModel>(
    pipeline: &Pipeline<M>,
    text: &str,
    timestamp: DateTime<Utc>,
    max_retries: u32,
    backoff_ms: u64,
) -> Result<String, PipelineError> {
    let mut attempt = 0;
    loop {
        match pipeline.generate_document(text, timestamp).await {
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = retry_delay(backoff_ms, attempt);
                warn!(
                    "Model unavailable, retrying in {:?} (attempt {}/{})",
                    delay, attempt, max_retries
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}
