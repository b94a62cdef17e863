use crate::Instance;

/// One failed fetch attempt inside a fallback walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub instance: Instance,
    pub cause: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LookoutError {
    #[error("No instances configured")]
    NoInstancesConfigured,

    #[error("Invalid instance: {0:?}")]
    InvalidInstance(String),

    #[error("Invalid handle: {0:?}")]
    InvalidHandle(String),

    #[error("Fetch from {instance} failed: {cause}")]
    Fetch { instance: Instance, cause: String },

    #[error("All {attempts} instances failed. Last error: {last_cause}")]
    AllInstancesFailed {
        attempts: usize,
        last_cause: String,
        failures: Vec<FetchFailure>,
    },

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, LookoutError>;
