//! Concept retrieval: the schema subset relevant to a query.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::coarse::CoarseRecallFilter;
use super::models::{ActionTypeConcept, ConceptRetrieval, ObjectTypeConcept, RelationTypeConcept};
use super::pruner::prune_properties;
use super::relation::RelationRanker;
use super::selector::select_object_types;
use crate::config::RetrievalConfig;
use crate::ontology::{
    InstanceQueryRequest, KnowledgeNetworkDetail, OntologyError, OntologyManager, OntologyQuery,
    SCORE_FIELD,
};
use crate::rerank::RerankService;

/// Runs coarse recall, relation ranking, object selection, property pruning
/// and the optional sample fetch over one knowledge network.
pub struct ConceptRetriever<'a> {
    manager: &'a dyn OntologyManager,
    query_client: &'a dyn OntologyQuery,
    reranker: &'a dyn RerankService,
}

impl<'a> ConceptRetriever<'a> {
    pub fn new(
        manager: &'a dyn OntologyManager,
        query_client: &'a dyn OntologyQuery,
        reranker: &'a dyn RerankService,
    ) -> Self {
        Self {
            manager,
            query_client,
            reranker,
        }
    }

    /// Retrieve the concepts of `kn_id` relevant to `query`.
    ///
    /// Only a failure to load the network schema is returned as an error.
    pub async fn retrieve(
        &self,
        kn_id: &str,
        query: &str,
        enable_rerank: bool,
        config: &RetrievalConfig,
    ) -> Result<ConceptRetrieval, OntologyError> {
        let mut detail = self.manager.get_knowledge_network_detail(kn_id).await?;
        debug!(
            object_types = detail.object_types.len(),
            relation_types = detail.relation_types.len(),
            action_types = detail.action_types.len(),
            "knowledge network loaded"
        );

        if CoarseRecallFilter::should_run(&detail, config) {
            info!(
                relation_types = detail.relation_types.len(),
                threshold = config.coarse_min_relation_count,
                "running coarse recall"
            );
            detail = CoarseRecallFilter::new(self.manager)
                .apply(kn_id, query, detail, config)
                .await;
        }

        let KnowledgeNetworkDetail {
            id: network_id,
            object_types,
            relation_types,
            action_types,
            ..
        } = detail;

        let object_names: HashMap<String, String> = object_types
            .iter()
            .filter(|obj| !obj.id.is_empty())
            .map(|obj| (obj.id.clone(), obj.name.clone()))
            .collect();

        let candidate_relations = relation_types.len();
        let relations = RelationRanker::new(self.reranker)
            .rank(query, &object_types, relation_types, config.top_k, enable_rerank)
            .await;
        debug!(candidates = candidate_relations, kept = relations.len(), "relation types ranked");

        let selected = select_object_types(object_types, &relations, config.top_k);
        debug!(selected = selected.len(), "object types selected");

        let brief = config.schema_brief;
        let mut objects: Vec<ObjectTypeConcept> = selected
            .iter()
            .map(|obj| ObjectTypeConcept::from_object_type(obj, brief))
            .collect();
        let relation_concepts = relations
            .iter()
            .map(|rel| RelationTypeConcept::from_relation_type(rel, brief))
            .collect();

        let kn_id_out = if network_id.is_empty() { kn_id } else { network_id.as_str() };
        let actions = action_types
            .iter()
            .map(|act| {
                let owner = object_names
                    .get(&act.object_type_id)
                    .map(String::as_str)
                    .unwrap_or("");
                ActionTypeConcept::from_action_type(act, kn_id_out, owner)
            })
            .collect();

        prune_properties(
            &mut objects,
            query,
            config.per_object_property_top_k,
            config.global_property_top_k,
        );

        if config.include_sample_data {
            self.attach_samples(kn_id, &mut objects, brief).await;
        }

        Ok(ConceptRetrieval {
            object_types: objects,
            relation_types: relation_concepts,
            action_types: actions,
            selected,
        })
    }

    /// Attach one instance to every object type. Failures leave the sample
    /// empty.
    async fn attach_samples(&self, kn_id: &str, objects: &mut [ObjectTypeConcept], brief: bool) {
        let request = InstanceQueryRequest::sample(1);
        for object in objects.iter_mut() {
            let instances = match self
                .query_client
                .query_object_instances(kn_id, &object.concept_id, &request)
                .await
            {
                Ok(instances) => instances,
                Err(e) => {
                    warn!(object_type_id = %object.concept_id, error = %e, "sample fetch failed");
                    continue;
                }
            };

            if let Some(Value::Object(mut sample)) = instances.data.into_iter().next() {
                if brief {
                    sample.remove(SCORE_FIELD);
                }
                object.sample_data = Some(sample);
            }
        }
    }
}
