//! In-memory collaborators for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use knsearch_core::ontology::{
    ConceptEntries, ConceptSearchRequest, DataProperty, InstanceQueryRequest,
    KnowledgeNetworkDetail, ObjectInstances, ObjectType, OntologyError, OntologyManager,
    OntologyQuery, RelationType, ScoredConcept,
};
use knsearch_core::rerank::{RerankError, RerankResult, RerankService};
use knsearch_core::{RetrievalConfig, SearchPipeline};

/// Serves a fixed knowledge network and fixed coarse search hits.
#[derive(Default)]
pub struct FakeManager {
    pub detail: KnowledgeNetworkDetail,
    pub fail_detail: bool,
    /// `None` makes the object search fail.
    pub object_hits: Option<Vec<ScoredConcept>>,
    /// `None` makes the relation search fail.
    pub relation_hits: Option<Vec<ScoredConcept>>,
    pub detail_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl FakeManager {
    pub fn new(detail: KnowledgeNetworkDetail) -> Self {
        Self {
            detail,
            ..Default::default()
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OntologyManager for FakeManager {
    async fn get_knowledge_network_detail(
        &self,
        _kn_id: &str,
    ) -> Result<KnowledgeNetworkDetail, OntologyError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detail {
            return Err(OntologyError::ApiError {
                status: 404,
                message: "knowledge network not found".to_string(),
            });
        }
        Ok(self.detail.clone())
    }

    async fn search_object_types(
        &self,
        _kn_id: &str,
        _request: &ConceptSearchRequest,
    ) -> Result<ConceptEntries, OntologyError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match &self.object_hits {
            Some(entries) => Ok(ConceptEntries {
                entries: entries.clone(),
            }),
            None => Err(OntologyError::Network("connection refused".to_string())),
        }
    }

    async fn search_relation_types(
        &self,
        _kn_id: &str,
        _request: &ConceptSearchRequest,
    ) -> Result<ConceptEntries, OntologyError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match &self.relation_hits {
            Some(entries) => Ok(ConceptEntries {
                entries: entries.clone(),
            }),
            None => Err(OntologyError::Network("connection refused".to_string())),
        }
    }
}

/// Serves instances per object type and records every query.
#[derive(Default)]
pub struct FakeQuery {
    pub instances: HashMap<String, Vec<Value>>,
    pub failing: HashSet<String>,
    pub calls: Mutex<Vec<(String, InstanceQueryRequest)>>,
}

impl FakeQuery {
    pub fn with_instances(mut self, object_type_id: &str, instances: Vec<Value>) -> Self {
        self.instances.insert(object_type_id.to_string(), instances);
        self
    }

    pub fn failing_on(mut self, object_type_id: &str) -> Self {
        self.failing.insert(object_type_id.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn queried_types(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<InstanceQueryRequest> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(_, req)| req.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OntologyQuery for FakeQuery {
    async fn query_object_instances(
        &self,
        _kn_id: &str,
        object_type_id: &str,
        request: &InstanceQueryRequest,
    ) -> Result<ObjectInstances, OntologyError> {
        self.calls
            .lock()
            .unwrap()
            .push((object_type_id.to_string(), request.clone()));

        if self.failing.contains(object_type_id) {
            return Err(OntologyError::ApiError {
                status: 500,
                message: "query engine unavailable".to_string(),
            });
        }

        let mut data = self
            .instances
            .get(object_type_id)
            .cloned()
            .unwrap_or_default();
        data.truncate(request.limit);
        Ok(ObjectInstances { data })
    }
}

/// Returns fixed scores by document position, or fails.
#[derive(Default)]
pub struct FakeReranker {
    /// `None` makes every call fail.
    pub scores: Option<Vec<f64>>,
    pub calls: AtomicUsize,
    pub documents: Mutex<Vec<String>>,
}

impl FakeReranker {
    pub fn with_scores(scores: Vec<f64>) -> Self {
        Self {
            scores: Some(scores),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RerankService for FakeReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
    ) -> Result<Vec<RerankResult>, RerankError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.documents.lock().unwrap() = documents.to_vec();

        let scores = self.scores.as_ref().ok_or_else(|| RerankError::ApiError {
            status: 503,
            message: "model not loaded".to_string(),
        })?;

        // reversed to check that results are matched by index, not position
        Ok(scores
            .iter()
            .enumerate()
            .take(documents.len())
            .map(|(index, &relevance_score)| RerankResult {
                index,
                relevance_score,
            })
            .rev()
            .collect())
    }
}

pub fn object_type(id: &str, name: &str, score: f64) -> ObjectType {
    ObjectType {
        id: id.to_string(),
        name: name.to_string(),
        score,
        ..Default::default()
    }
}

pub fn relation(id: &str, name: &str, source: &str, target: &str) -> RelationType {
    RelationType {
        id: id.to_string(),
        name: name.to_string(),
        source_object_type_id: source.to_string(),
        target_object_type_id: target.to_string(),
        ..Default::default()
    }
}

pub fn property(name: &str, property_type: &str, operations: &[&str]) -> DataProperty {
    DataProperty {
        name: name.to_string(),
        comment: String::new(),
        property_type: property_type.to_string(),
        condition_operations: operations.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn hit(id: &str, score: f64) -> ScoredConcept {
    ScoredConcept {
        id: id.to_string(),
        name: String::new(),
        score,
    }
}

pub fn network(objects: Vec<ObjectType>, relations: Vec<RelationType>) -> KnowledgeNetworkDetail {
    KnowledgeNetworkDetail {
        id: "kn_test".to_string(),
        name: "test network".to_string(),
        object_types: objects,
        relation_types: relations,
        action_types: Vec::new(),
    }
}

pub fn pipeline(
    manager: &Arc<FakeManager>,
    query: &Arc<FakeQuery>,
    reranker: &Arc<FakeReranker>,
    defaults: RetrievalConfig,
) -> SearchPipeline {
    SearchPipeline::new(manager.clone(), query.clone(), reranker.clone(), defaults)
}
