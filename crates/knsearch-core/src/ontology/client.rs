use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    ConceptEntries, ConceptSearchRequest, InstanceQueryRequest, KnowledgeNetworkDetail,
    ObjectInstances, OntologyError, OntologyManager, OntologyQuery,
};
use crate::config::OntologyConfig;

const MANAGER_PREFIX: &str = "/api/ontology-manager/in/v1/knowledge-networks";
const QUERY_PREFIX: &str = "/api/ontology-query/in/v1/knowledge-networks";

const HEADER_METHOD_OVERRIDE: &str = "x-http-method-override";
const HEADER_ACCOUNT_ID: &str = "x-account-id";
const HEADER_ACCOUNT_TYPE: &str = "x-account-type";

/// REST client for the ontology-manager and ontology-query services.
///
/// Searches are sent as `POST` with `X-HTTP-Method-Override: GET`, which is
/// how both services accept a query body on a read endpoint.
pub struct HttpOntologyClient {
    manager_url: String,
    query_url: String,
    account_id: Option<String>,
    account_type: String,
    client: Client,
}

impl HttpOntologyClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `manager_url` - ontology-manager base URL (e.g., "http://ontology-manager:13014")
    /// * `query_url` - ontology-query base URL (e.g., "http://ontology-query:13018")
    pub fn new(manager_url: impl Into<String>, query_url: impl Into<String>) -> Self {
        Self {
            manager_url: manager_url.into().trim_end_matches('/').to_string(),
            query_url: query_url.into().trim_end_matches('/').to_string(),
            account_id: None,
            account_type: crate::config::DEFAULT_ACCOUNT_TYPE.to_string(),
            client: Client::new(),
        }
    }

    /// Creates a client from the `[ontology]` config section.
    pub fn from_config(config: &OntologyConfig) -> Self {
        let mut client = Self::new(&config.manager_url, &config.query_url);
        client.account_id = config.account_id.clone();
        client.account_type = config.account_type.clone();
        client
    }

    fn with_headers(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("content-type", "application/json");
        match self.account_id {
            Some(ref id) => req
                .header(HEADER_ACCOUNT_ID, id)
                .header(HEADER_ACCOUNT_TYPE, &self.account_type),
            None => req,
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R, OntologyError> {
        let req = self.with_headers(self.client.get(url));
        Self::read_json(req).await
    }

    async fn search_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, OntologyError> {
        let req = self
            .with_headers(self.client.post(url))
            .header(HEADER_METHOD_OVERRIDE, "GET")
            .json(body);
        Self::read_json(req).await
    }

    async fn read_json<R: DeserializeOwned>(req: RequestBuilder) -> Result<R, OntologyError> {
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OntologyError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| OntologyError::ParseError(e.to_string()))
    }

    fn manager_endpoint(&self, kn_id: &str, suffix: &str) -> String {
        format!("{}{}/{}{}", self.manager_url, MANAGER_PREFIX, kn_id, suffix)
    }
}

#[async_trait]
impl OntologyManager for HttpOntologyClient {
    async fn get_knowledge_network_detail(
        &self,
        kn_id: &str,
    ) -> Result<KnowledgeNetworkDetail, OntologyError> {
        if kn_id.trim().is_empty() {
            return Err(OntologyError::RequestFailed(
                "knowledge network id is empty".to_string(),
            ));
        }
        let url = self.manager_endpoint(kn_id, "?mode=export");
        self.get_json(&url).await
    }

    async fn search_object_types(
        &self,
        kn_id: &str,
        request: &ConceptSearchRequest,
    ) -> Result<ConceptEntries, OntologyError> {
        let url = self.manager_endpoint(kn_id, "/object-types");
        self.search_json(&url, request).await
    }

    async fn search_relation_types(
        &self,
        kn_id: &str,
        request: &ConceptSearchRequest,
    ) -> Result<ConceptEntries, OntologyError> {
        let url = self.manager_endpoint(kn_id, "/relation-types");
        self.search_json(&url, request).await
    }
}

#[async_trait]
impl OntologyQuery for HttpOntologyClient {
    async fn query_object_instances(
        &self,
        kn_id: &str,
        object_type_id: &str,
        request: &InstanceQueryRequest,
    ) -> Result<ObjectInstances, OntologyError> {
        let url = format!(
            "{}{}/{}/object-types/{}",
            self.query_url, QUERY_PREFIX, kn_id, object_type_id
        );
        self.search_json(&url, request).await
    }
}
