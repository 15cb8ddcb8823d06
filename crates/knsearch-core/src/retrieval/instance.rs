//! Semantic instance retrieval and scoring.
//!
//! For every selected object type with at least one searchable field, one
//! OR-combined query is sent to the ontology query service. Candidates are
//! scored, capped per type, then filtered across types against the best
//! score seen.

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fields::{searchable_fields, SearchableField};
use super::models::Node;
use super::scoring::instance_name_score;
use crate::config::{RetrievalConfig, TRUNCATION_SUFFIX};
use crate::ontology::{
    Condition, InstanceQueryRequest, ObjectType, OntologyError, OntologyQuery, SCORE_FIELD,
};

const UNIQUE_IDENTITIES_KEYS: [&str; 2] = ["unique_identities", "_instance_identity"];
const INSTANCE_NAME_KEYS: [&str; 2] = ["instance_name", "_display"];

pub const NO_SEARCHABLE_FIELDS_MESSAGE: &str =
    "None of the selected object types has a semantically searchable property.";
pub const NO_MATCHING_INSTANCES_MESSAGE: &str = "No instances matched the query.";

/// Errors from instance retrieval.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Instance query failed for all {attempted} object types: {last}")]
    AllQueriesFailed {
        attempted: usize,
        last: OntologyError,
    },
}

/// Outcome of instance retrieval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceRetrieval {
    pub nodes: Vec<Node>,
    pub message: Option<String>,
}

/// Retrieves scored instances for selected object types.
pub struct SemanticInstanceRetriever<'a> {
    query_client: &'a dyn OntologyQuery,
}

impl<'a> SemanticInstanceRetriever<'a> {
    pub fn new(query_client: &'a dyn OntologyQuery) -> Self {
        Self { query_client }
    }

    /// Retrieve instances of `object_types` relevant to `query`.
    ///
    /// Types without searchable fields are skipped without a query. A failed
    /// type is logged and contributes nothing; only when every query fails is
    /// an error returned.
    pub async fn retrieve(
        &self,
        kn_id: &str,
        query: &str,
        object_types: &[ObjectType],
        config: &RetrievalConfig,
    ) -> Result<InstanceRetrieval, InstanceError> {
        let targets: Vec<(&ObjectType, Vec<SearchableField>)> = object_types
            .iter()
            .filter_map(|obj| {
                let fields = searchable_fields(obj);
                if fields.is_empty() {
                    debug!(object_type_id = %obj.id, "no searchable fields, skipping");
                    None
                } else {
                    Some((obj, fields))
                }
            })
            .collect();

        if targets.is_empty() {
            return Ok(InstanceRetrieval {
                nodes: Vec::new(),
                message: Some(NO_SEARCHABLE_FIELDS_MESSAGE.to_string()),
            });
        }

        let attempted = targets.len();
        let outcomes: Vec<_> = stream::iter(targets)
            .map(|(obj, fields)| async move {
                let outcome = self.retrieve_type(kn_id, query, obj, &fields, config).await;
                (obj, outcome)
            })
            .buffered(config.max_concurrency.max(1))
            .collect()
            .await;

        let mut nodes = Vec::new();
        let mut failed = 0;
        let mut last_error = None;
        for (obj, outcome) in outcomes {
            match outcome {
                Ok(found) => nodes.extend(found),
                Err(e) => {
                    warn!(object_type_id = %obj.id, error = %e, "instance query failed, skipping object type");
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if failed == attempted {
            if let Some(last) = last_error {
                return Err(InstanceError::AllQueriesFailed { attempted, last });
            }
        }

        let nodes = aggregate_nodes(nodes, config);
        info!(nodes = nodes.len(), object_types = attempted, "instance retrieval completed");

        let message = nodes
            .is_empty()
            .then(|| NO_MATCHING_INSTANCES_MESSAGE.to_string());
        Ok(InstanceRetrieval { nodes, message })
    }

    async fn retrieve_type(
        &self,
        kn_id: &str,
        query: &str,
        object_type: &ObjectType,
        fields: &[SearchableField],
        config: &RetrievalConfig,
    ) -> Result<Vec<Node>, OntologyError> {
        let condition = build_semantic_condition(
            fields,
            query,
            config.per_type_instance_limit,
            config.max_semantic_sub_conditions,
        );
        let request = InstanceQueryRequest::matching(condition, config.initial_candidate_count);
        let instances = self
            .query_client
            .query_object_instances(kn_id, &object_type.id, &request)
            .await?;

        let mut nodes: Vec<Node> = instances
            .data
            .into_iter()
            .filter_map(|raw| match raw {
                Value::Object(map) => Some(to_node(object_type, map)),
                _ => None,
            })
            .collect();

        score_nodes(&mut nodes, query, config.exact_name_match_score);
        let ranked = rank_nodes(nodes, config.per_type_instance_limit, config.min_direct_relevance);
        debug!(object_type_id = %object_type.id, kept = ranked.len(), "object type instances ranked");
        Ok(ranked)
    }
}

/// OR-combine knn, then exact, then keyword sub-conditions, capped at
/// `max_sub_conditions`.
pub fn build_semantic_condition(
    fields: &[SearchableField],
    query: &str,
    knn_limit: usize,
    max_sub_conditions: usize,
) -> Condition {
    let knn = fields
        .iter()
        .filter(|f| f.knn)
        .map(|f| Condition::knn(&f.name, query, knn_limit));
    let equal = fields
        .iter()
        .filter(|f| f.equal)
        .map(|f| Condition::equal(&f.name, query));
    let keyword = fields
        .iter()
        .filter(|f| f.keyword)
        .map(|f| Condition::keyword(&f.name, query));

    Condition::or(knn.chain(equal).chain(keyword).take(max_sub_conditions).collect())
}

/// Split a raw instance into a [`Node`].
pub fn to_node(object_type: &ObjectType, mut raw: Map<String, Value>) -> Node {
    let mut unique_identities = Map::new();
    for key in UNIQUE_IDENTITIES_KEYS {
        if let Some(Value::Object(ids)) = raw.remove(key) {
            if unique_identities.is_empty() {
                unique_identities = ids;
            }
        }
    }

    let mut instance_name = String::new();
    for key in INSTANCE_NAME_KEYS {
        if let Some(value) = raw.remove(key) {
            if instance_name.is_empty() {
                instance_name = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
            }
        }
    }

    let score = raw.remove(SCORE_FIELD).and_then(|v| v.as_f64()).unwrap_or(0.0);

    Node {
        object_type_id: object_type.id.clone(),
        object_type_name: object_type.name.clone(),
        unique_identities,
        instance_name,
        properties: raw,
        score,
    }
}

/// Score nodes that came back without an engine score.
pub fn score_nodes(nodes: &mut [Node], query: &str, exact_match_score: f64) {
    for node in nodes.iter_mut().filter(|n| n.score == 0.0) {
        node.score = instance_name_score(query, &node.instance_name, exact_match_score);
    }
}

/// Stable-sort by score, keep `limit`, drop anything under `min_relevance`.
pub fn rank_nodes(mut nodes: Vec<Node>, limit: usize, min_relevance: f64) -> Vec<Node> {
    nodes.sort_by(|a, b| b.score.total_cmp(&a.score));
    nodes.truncate(limit);
    nodes.retain(|n| n.score >= min_relevance);
    nodes
}

/// Cross-type aggregation: ratio filter, re-sort, property redaction.
pub fn aggregate_nodes(nodes: Vec<Node>, config: &RetrievalConfig) -> Vec<Node> {
    let mut nodes = if config.enable_global_final_score_ratio {
        apply_score_ratio(nodes, config.global_final_score_ratio)
    } else {
        nodes
    };

    nodes.sort_by(|a, b| b.score.total_cmp(&a.score));

    if config.enable_property_filter {
        for node in &mut nodes {
            redact_properties(
                &mut node.properties,
                config.max_properties_per_instance,
                config.max_property_value_length,
            );
        }
    }
    nodes
}

/// Drop nodes scoring below `max * ratio`.
///
/// If that would leave nothing, the single best node is kept.
pub fn apply_score_ratio(nodes: Vec<Node>, ratio: f64) -> Vec<Node> {
    let max_score = nodes.iter().map(|n| n.score).fold(0.0, f64::max);
    if max_score <= 0.0 {
        return nodes;
    }

    let threshold = max_score * ratio;
    let mut best: Option<Node> = None;
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.score >= threshold {
            kept.push(node);
        } else if best.as_ref().map_or(true, |b| node.score > b.score) {
            best = Some(node);
        }
    }

    if kept.is_empty() {
        kept.extend(best);
    }
    kept
}

/// Keep the lexicographically first `max_properties` keys and truncate long
/// string values to `max_value_length` characters plus a suffix.
pub fn redact_properties(
    properties: &mut Map<String, Value>,
    max_properties: usize,
    max_value_length: usize,
) {
    if properties.len() > max_properties {
        let mut keys: Vec<String> = properties.keys().cloned().collect();
        keys.sort();
        for key in keys.into_iter().skip(max_properties) {
            properties.remove(&key);
        }
    }

    for value in properties.values_mut() {
        if let Value::String(s) = value {
            if s.chars().count() > max_value_length {
                let mut truncated: String = s.chars().take(max_value_length).collect();
                truncated.push_str(TRUNCATION_SUFFIX);
                *s = truncated;
            }
        }
    }
}
