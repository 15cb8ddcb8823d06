use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RerankError, RerankResult, RerankService};
use crate::config::RerankConfig;

/// HTTP rerank client.
///
/// Speaks the common `{model, query, documents} -> {results: [{index, relevance_score}]}`
/// shape used by most hosted rerankers (Jina, Cohere-compatible, BGE servers).
pub struct HttpRerankClient {
    url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpRerankClient {
    /// Creates a new rerank client for the given endpoint and model.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            client: Client::new(),
        }
    }

    /// Creates a client from the `[rerank]` config section.
    pub fn from_config(config: &RerankConfig) -> Self {
        let mut client = Self::new(&config.url, &config.model);
        client.api_key = config.api_key.clone();
        client
    }
}

#[async_trait]
impl RerankService for HttpRerankClient {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankResult>, RerankError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
        };

        let mut req = self
            .client
            .post(&self.url)
            .header("content-type", "application/json");

        // Only add authorization if an api key is configured
        if let Some(ref key) = self.api_key {
            req = req.header("authorization", format!("Bearer {}", key));
        }

        let response = req.json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RerankError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| RerankError::ParseError(e.to_string()))?;

        if parsed.results.is_empty() {
            return Err(RerankError::EmptyResult(documents.len()));
        }

        Ok(parsed.results)
    }
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    #[serde(default)]
    results: Vec<RerankResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpRerankClient::new("http://rerank:9898/v1/rerank/", "bge-reranker");
        assert_eq!(client.url, "http://rerank:9898/v1/rerank");
        assert_eq!(client.model, "bge-reranker");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"results":[{"index":1,"relevance_score":0.9},{"index":0,"relevance_score":0.1}]}"#;
        let parsed: RerankResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results[0].index, 1);
        assert_eq!(parsed.results[1].relevance_score, 0.1);
    }

    #[tokio::test]
    async fn test_empty_documents_skip_request() {
        let client = HttpRerankClient::new("http://127.0.0.1:9", "m");
        let results = client.rerank("q", &[]).await.unwrap();
        assert!(results.is_empty());
    }
}
