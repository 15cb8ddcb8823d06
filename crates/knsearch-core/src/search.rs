//! The knowledge network search entry point.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, RetrievalConfig, RetrievalOverrides};
use crate::ontology::{HttpOntologyClient, OntologyError, OntologyManager, OntologyQuery};
use crate::rerank::{HttpRerankClient, RerankService};
use crate::retrieval::{
    ActionTypeConcept, Concept, ConceptResult, ConceptRetriever, Node, ObjectTypeConcept,
    RelationTypeConcept, SemanticInstanceRetriever,
};

pub const NO_OBJECT_TYPES_MESSAGE: &str =
    "No object types were selected for the query, so no instances were retrieved.";
pub const INSTANCE_RETRIEVAL_FAILED_MESSAGE: &str =
    "Instance retrieval failed; only schema concepts are returned.";

/// Errors surfaced to search callers.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Failed to load knowledge network: {0}")]
    Detail(#[from] OntologyError),

    #[error("Invalid search request: {0}")]
    InvalidRequest(String),
}

/// A search over one knowledge network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub kn_id: String,
    pub query: String,
    /// Return schema concepts only; instance retrieval is not run.
    pub only_schema: bool,
    /// Rank relation types through the rerank service.
    pub enable_rerank: bool,
    /// Per-request knobs merged over the pipeline defaults.
    pub retrieval_config: Option<RetrievalOverrides>,
}

impl SearchRequest {
    pub fn new(kn_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            kn_id: kn_id.into(),
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub object_types: Vec<ObjectTypeConcept>,
    pub relation_types: Vec<RelationTypeConcept>,
    pub action_types: Vec<ActionTypeConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchResponse {
    /// Flatten the schema part of the response into scored concepts.
    ///
    /// Action types carry no score of their own and are reported as zero.
    pub fn concept_results(&self) -> Vec<ConceptResult> {
        let objects = self.object_types.iter().map(|o| ConceptResult {
            score: o.score,
            concept: Concept::Object(o.clone()),
        });
        let relations = self.relation_types.iter().map(|r| ConceptResult {
            score: r.score,
            concept: Concept::Relation(r.clone()),
        });
        let actions = self.action_types.iter().map(|a| ConceptResult {
            score: 0.0,
            concept: Concept::Action(a.clone()),
        });
        objects.chain(relations).chain(actions).collect()
    }
}

/// Concept retrieval followed by instance retrieval.
pub struct SearchPipeline {
    manager: Arc<dyn OntologyManager>,
    query_client: Arc<dyn OntologyQuery>,
    reranker: Arc<dyn RerankService>,
    defaults: RetrievalConfig,
}

impl SearchPipeline {
    /// Creates a pipeline over the given collaborators.
    pub fn new(
        manager: Arc<dyn OntologyManager>,
        query_client: Arc<dyn OntologyQuery>,
        reranker: Arc<dyn RerankService>,
        defaults: RetrievalConfig,
    ) -> Self {
        Self {
            manager,
            query_client,
            reranker,
            defaults: defaults.normalized(),
        }
    }

    /// Creates a pipeline talking to the HTTP services named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let ontology = Arc::new(HttpOntologyClient::from_config(&config.ontology));
        Self::new(
            ontology.clone(),
            ontology,
            Arc::new(HttpRerankClient::from_config(&config.rerank)),
            config.retrieval.clone(),
        )
    }

    /// Run a search.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        if request.kn_id.trim().is_empty() {
            return Err(SearchError::InvalidRequest("kn_id is required".to_string()));
        }

        let span = info_span!(
            "kn_search",
            request_id = %Uuid::new_v4(),
            kn_id = %request.kn_id
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let config = self.defaults.with_overrides(request.retrieval_config.as_ref());

        let concepts = ConceptRetriever::new(
            self.manager.as_ref(),
            self.query_client.as_ref(),
            self.reranker.as_ref(),
        )
        .retrieve(&request.kn_id, &request.query, request.enable_rerank, &config)
        .await?;

        info!(
            object_types = concepts.object_types.len(),
            relation_types = concepts.relation_types.len(),
            action_types = concepts.action_types.len(),
            "concept retrieval completed"
        );

        let mut response = SearchResponse {
            object_types: concepts.object_types,
            relation_types: concepts.relation_types,
            action_types: concepts.action_types,
            nodes: Vec::new(),
            message: None,
        };

        if request.only_schema {
            return Ok(response);
        }

        if concepts.selected.is_empty() {
            response.message = Some(NO_OBJECT_TYPES_MESSAGE.to_string());
            return Ok(response);
        }

        let retriever = SemanticInstanceRetriever::new(self.query_client.as_ref());
        match retriever
            .retrieve(&request.kn_id, &request.query, &concepts.selected, &config)
            .await
        {
            Ok(instances) => {
                response.nodes = instances.nodes;
                response.message = instances.message;
            }
            Err(e) => {
                warn!(error = %e, "instance retrieval failed, returning concepts only");
                response.message = Some(INSTANCE_RETRIEVAL_FAILED_MESSAGE.to_string());
            }
        }

        Ok(response)
    }
}
