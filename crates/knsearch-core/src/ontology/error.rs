use thiserror::Error;

/// Errors that can occur when talking to the ontology services.
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Ontology service returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for OntologyError {
    fn from(err: reqwest::Error) -> Self {
        OntologyError::Network(err.to_string())
    }
}
