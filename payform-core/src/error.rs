use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayformError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PayformError>;
