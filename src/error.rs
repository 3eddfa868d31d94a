use thiserror::Error;

/// Error types for the flatcast service
#[derive(Error, Debug)]
pub enum FlatcastError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file: {path}")]
    InvalidConfig { path: String },

    // Request validation errors
    #[error("Invalid listing URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Domain not allowed: {domain}")]
    DomainNotAllowed { domain: String },

    // Rendering session errors
    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Navigation timeout: {url}")]
    NavigationTimeout { url: String },

    #[error("Browser automation not available")]
    BrowserUnavailable,

    // Extraction errors (caught at tier boundaries, never fatal)
    #[error("Extraction error in {tier} tier: {message}")]
    Extraction { tier: String, message: String },

    // Normalization errors (per-field, the field is dropped)
    #[error("Failed to normalize field '{field}': {message}")]
    Normalization { field: String, message: String },

    // Model and inference errors
    #[error("Model artifact loading failed: {path}")]
    ModelLoad { path: String },

    #[error("Feature schema mismatch: {message}")]
    SchemaMismatch { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FlatcastError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session { message: message.into() }
    }

    /// Create an extraction error for a specific tier
    pub fn extraction(tier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction { tier: tier.into(), message: message.into() }
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference { message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether the error was caused by the client's request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::DomainNotAllowed { .. })
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } | Self::InvalidConfig { .. } => "configuration",
            Self::InvalidUrl { .. } | Self::DomainNotAllowed { .. } => "validation",
            Self::Session { .. } | Self::NavigationTimeout { .. } | Self::BrowserUnavailable => {
                "session"
            }
            Self::Extraction { .. } => "extraction",
            Self::Normalization { .. } => "normalization",
            Self::ModelLoad { .. } | Self::SchemaMismatch { .. } | Self::Inference { .. } => {
                "inference"
            }
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for flatcast
pub type FlatcastResult<T> = std::result::Result<T, FlatcastError>;

impl From<anyhow::Error> for FlatcastError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal { message: err.to_string() }
    }
}
