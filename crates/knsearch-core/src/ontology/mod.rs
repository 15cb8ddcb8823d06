//! Access to the ontology services.
//!
//! Two collaborators back the retrieval pipeline:
//! - [`OntologyManager`] - knowledge network schema and the concept search index
//! - [`OntologyQuery`] - object instances stored behind each object type
//!
//! [`HttpOntologyClient`] implements both against the ontology-manager and
//! ontology-query REST services. Tests substitute in-memory fakes.

mod client;
mod condition;
mod error;
mod models;

pub use client::HttpOntologyClient;
pub use condition::{
    Condition, ConceptSearchRequest, InstanceQueryRequest, Operation, SortParams, ValueFrom,
    ANY_FIELD, SCORE_FIELD,
};
pub use error::OntologyError;
pub use models::{
    ActionType, ConceptEntries, DataProperty, KnowledgeNetworkDetail, LogicProperty,
    ObjectInstances, ObjectType, RelationType, ScoredConcept,
};

use async_trait::async_trait;

/// Schema access and concept search for knowledge networks.
#[async_trait]
pub trait OntologyManager: Send + Sync {
    /// Fetch the full schema (object, relation and action types) of a network.
    async fn get_knowledge_network_detail(
        &self,
        kn_id: &str,
    ) -> Result<KnowledgeNetworkDetail, OntologyError>;

    /// Search object types of a network against the concept index.
    async fn search_object_types(
        &self,
        kn_id: &str,
        request: &ConceptSearchRequest,
    ) -> Result<ConceptEntries, OntologyError>;

    /// Search relation types of a network against the concept index.
    async fn search_relation_types(
        &self,
        kn_id: &str,
        request: &ConceptSearchRequest,
    ) -> Result<ConceptEntries, OntologyError>;
}

/// Instance access for object types.
#[async_trait]
pub trait OntologyQuery: Send + Sync {
    /// Query instances of one object type.
    async fn query_object_instances(
        &self,
        kn_id: &str,
        object_type_id: &str,
        request: &InstanceQueryRequest,
    ) -> Result<ObjectInstances, OntologyError>;
}
