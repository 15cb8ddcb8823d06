//! Relevance reranking through an external cross-encoder service.

mod client;
mod error;

pub use client::HttpRerankClient;
pub use error::RerankError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Relevance of one document to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    /// Position of the document in the submitted batch.
    pub index: usize,
    /// Higher is more relevant.
    pub relevance_score: f64,
}

/// Trait for rerank providers.
///
/// All documents are scored against the query in a single call. Results may
/// come back in any order; `index` ties each score to its document.
#[async_trait]
pub trait RerankService: Send + Sync {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankResult>, RerankError>;
}
