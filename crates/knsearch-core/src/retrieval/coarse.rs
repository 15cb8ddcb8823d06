//! Coarse recall: a cheap index-backed pre-filter for very large schemas.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::config::RetrievalConfig;
use crate::ontology::{ConceptEntries, ConceptSearchRequest, KnowledgeNetworkDetail, OntologyManager};

/// Narrows a knowledge network to the object and relation types the concept
/// index considers relevant, before any expensive ranking runs.
pub struct CoarseRecallFilter<'a> {
    manager: &'a dyn OntologyManager,
}

impl<'a> CoarseRecallFilter<'a> {
    pub fn new(manager: &'a dyn OntologyManager) -> Self {
        Self { manager }
    }

    /// Whether the network is large enough for coarse recall to run.
    pub fn should_run(detail: &KnowledgeNetworkDetail, config: &RetrievalConfig) -> bool {
        config.enable_coarse_recall && detail.relation_types.len() >= config.coarse_min_relation_count
    }

    /// Filter `detail` down to the coarse hit-sets.
    ///
    /// Each axis degrades on its own: a failed or empty search leaves that
    /// axis unfiltered. Scores from the index replace earlier scores on the
    /// retained entities. Action types are never filtered.
    pub async fn apply(
        &self,
        kn_id: &str,
        query: &str,
        detail: KnowledgeNetworkDetail,
        config: &RetrievalConfig,
    ) -> KnowledgeNetworkDetail {
        let object_hits = {
            let request = ConceptSearchRequest::hybrid(query, config.coarse_object_limit);
            match self.manager.search_object_types(kn_id, &request).await {
                Ok(entries) => hit_scores(entries),
                Err(e) => {
                    warn!(error = %e, "coarse object type search failed, keeping all object types");
                    HashMap::new()
                }
            }
        };

        let relation_hits = {
            let request = ConceptSearchRequest::hybrid(query, config.coarse_relation_limit);
            match self.manager.search_relation_types(kn_id, &request).await {
                Ok(entries) => hit_scores(entries),
                Err(e) => {
                    warn!(error = %e, "coarse relation type search failed, keeping all relation types");
                    HashMap::new()
                }
            }
        };

        let before = (detail.object_types.len(), detail.relation_types.len());
        let filtered = filter_detail(detail, &object_hits, &relation_hits);

        info!(
            objects_before = before.0,
            objects_after = filtered.object_types.len(),
            relations_before = before.1,
            relations_after = filtered.relation_types.len(),
            "coarse recall applied"
        );

        filtered
    }
}

/// Hit id -> score (zero when the index returned no positive score).
fn hit_scores(entries: ConceptEntries) -> HashMap<String, f64> {
    entries
        .entries
        .into_iter()
        .map(|entry| (entry.id, entry.score))
        .collect()
}

fn filter_detail(
    detail: KnowledgeNetworkDetail,
    object_hits: &HashMap<String, f64>,
    relation_hits: &HashMap<String, f64>,
) -> KnowledgeNetworkDetail {
    let KnowledgeNetworkDetail {
        id,
        name,
        object_types,
        relation_types,
        action_types,
    } = detail;

    let object_types = if object_hits.is_empty() {
        object_types
    } else {
        // endpoints of the coarse relations stay reachable even when the
        // object search missed them
        let mut candidates: HashSet<&str> = object_hits.keys().map(String::as_str).collect();
        for rel in &relation_types {
            if !relation_hits.contains_key(&rel.id) {
                continue;
            }
            if !rel.source_object_type_id.is_empty() {
                candidates.insert(&rel.source_object_type_id);
            }
            if !rel.target_object_type_id.is_empty() {
                candidates.insert(&rel.target_object_type_id);
            }
        }

        let pruned: Vec<_> = object_types
            .iter()
            .filter(|obj| candidates.contains(obj.id.as_str()))
            .cloned()
            .map(|mut obj| {
                if let Some(&score) = object_hits.get(&obj.id) {
                    if score > 0.0 {
                        obj.score = score;
                    }
                }
                obj
            })
            .collect();

        if pruned.is_empty() {
            object_types
        } else {
            pruned
        }
    };

    let relation_types = if relation_hits.is_empty() {
        relation_types
    } else {
        let pruned: Vec<_> = relation_types
            .iter()
            .filter_map(|rel| {
                relation_hits.get(&rel.id).map(|&score| {
                    let mut rel = rel.clone();
                    if score > 0.0 {
                        rel.score = score;
                    }
                    rel
                })
            })
            .collect();

        if pruned.is_empty() {
            relation_types
        } else {
            pruned
        }
    };

    KnowledgeNetworkDetail {
        id,
        name,
        object_types,
        relation_types,
        action_types,
    }
}
