use thiserror::Error;

/// Main error type for the pulse pipeline
#[derive(Error, Debug)]
pub enum PulseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Roster boundary errors, the only class that fails a whole run
    #[error("Roster unavailable: {0}")]
    Roster(String),

    // Notification delivery errors
    #[error("Alert delivery failed: {0}")]
    AlertDelivery(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for PulseError
pub type Result<T> = std::result::Result<T, PulseError>;

/// Transient adapter failure. A stat source returning this never aborts an
/// athlete's resolution; the resolver treats it like NotFound for fallback
/// purposes but logs it distinctly.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}
