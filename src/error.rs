use crate::repositories::RetrievalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Parse error: state '{state}' of {entity_id} is not numeric")]
    Parse { entity_id: String, state: String },

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
