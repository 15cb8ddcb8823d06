use thiserror::Error;

/// Errors that can occur during reranking.
#[derive(Debug, Error)]
pub enum RerankError {
    #[error("Rerank service returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse rerank response: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rerank service returned no results for {0} documents")]
    EmptyResult(usize),
}

impl From<reqwest::Error> for RerankError {
    fn from(err: reqwest::Error) -> Self {
        RerankError::Network(err.to_string())
    }
}
