#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
