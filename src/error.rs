use miette::Diagnostic;
use thiserror::Error;

/// Failures of the language-model transport, before any output is inspected
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("could not reach the model service at {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("model service did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("model service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model service sent an unreadable reply: {0}")]
    InvalidResponse(String),
}

/// Failures of turning user text into a validated event
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractionError {
    #[error("language model unavailable: {0}")]
    #[diagnostic(
        code(scec::model_unavailable),
        help("start the local model service (e.g. `ollama serve`) and check the endpoint URL")
    )]
    ModelUnavailable(#[source] ModelError),

    #[error("model output is not valid event JSON: {0}")]
    #[diagnostic(
        code(scec::malformed_output),
        help("the model did not follow the output format, try rephrasing the event")
    )]
    MalformedOutput(String),

    #[error("invalid or missing {field}: {reason}")]
    #[diagnostic(
        code(scec::schema_violation),
        help("could not understand the event details, mention at least a title and a time")
    )]
    SchemaViolation { field: String, reason: String },
}

impl ExtractionError {
    /// Name of the offending property for schema violations
    pub fn field(&self) -> Option<&str> {
        match self {
            ExtractionError::SchemaViolation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether a caller may reasonably retry the same request
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractionError::ModelUnavailable(_))
    }
}

/// Helper to create schema violations
pub fn schema_violation(field: &str, reason: impl Into<String>) -> ExtractionError {
    ExtractionError::SchemaViolation {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Serializer contract breaches; these indicate a bug upstream of the serializer
#[derive(Debug, Error, Diagnostic)]
pub enum SerializeError {
    #[error("event record violates serializer precondition: {0}")]
    #[diagnostic(code(scec::precondition_violation))]
    PreconditionViolation(String),
}

/// Error returned by the composed extract + serialize pipeline
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serialization(#[from] SerializeError),
}

impl PipelineError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::Extraction(e) if e.is_transient())
    }
}

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(scec::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(scec::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(scec::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(scec::serialization))]
    Serialization(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Other error: {0}")]
    #[diagnostic(code(scec::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}
