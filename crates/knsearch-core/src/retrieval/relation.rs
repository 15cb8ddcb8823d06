//! Relation type ranking.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::scoring::simple_match;
use crate::ontology::{ObjectType, RelationType};
use crate::rerank::RerankService;

/// Orders relation types by relevance to the query and keeps the top K.
pub struct RelationRanker<'a> {
    reranker: &'a dyn RerankService,
}

impl<'a> RelationRanker<'a> {
    pub fn new(reranker: &'a dyn RerankService) -> Self {
        Self { reranker }
    }

    /// Rank `relations` against `query`.
    ///
    /// Without rerank the input order is kept and only truncated. With rerank
    /// every relation is rendered as a phrase and scored in one batch; if that
    /// call fails the lexical [`simple_match`] score is used instead. Both
    /// paths sort stably, so equal scores keep their input order.
    pub async fn rank(
        &self,
        query: &str,
        object_types: &[ObjectType],
        relations: Vec<RelationType>,
        top_k: usize,
        enable_rerank: bool,
    ) -> Vec<RelationType> {
        if relations.is_empty() {
            return relations;
        }

        if !enable_rerank {
            return truncate(relations, top_k);
        }

        let documents = render_relations(object_types, &relations);
        match self.reranker.rerank(query, &documents).await {
            Ok(results) => {
                let mut scores = vec![0.0; relations.len()];
                for result in results {
                    if let Some(slot) = scores.get_mut(result.index) {
                        *slot = result.relevance_score;
                    }
                }
                let ranked = sort_by_scores(relations, scores, top_k);
                debug!(top_k = ranked.len(), "relation rerank completed");
                ranked
            }
            Err(e) => {
                warn!(error = %e, "relation rerank failed, falling back to simple match");
                rank_by_simple_match(query, relations, top_k)
            }
        }
    }
}

/// Lexical ranking used when the rerank service is unavailable.
///
/// The lexical score only orders; each relation keeps the score it came in
/// with.
pub fn rank_by_simple_match(query: &str, relations: Vec<RelationType>, top_k: usize) -> Vec<RelationType> {
    let mut scored: Vec<(RelationType, f64)> = relations
        .into_iter()
        .map(|rel| {
            let score = simple_match(query, &rel.name, &rel.comment);
            (rel, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(top_k).map(|(rel, _)| rel).collect()
}

/// Render each relation as `"{source} {relation}[, comment] {target}"`.
///
/// Blank relation names fall back to the relation id; blank object names to
/// the object id. Unknown endpoints are omitted.
pub fn render_relations(object_types: &[ObjectType], relations: &[RelationType]) -> Vec<String> {
    let names: HashMap<&str, &str> = object_types
        .iter()
        .filter(|obj| !obj.id.is_empty())
        .map(|obj| (obj.id.as_str(), obj.display_name()))
        .collect();

    relations
        .iter()
        .map(|rel| {
            let source = names.get(rel.source_object_type_id.as_str()).copied().unwrap_or("");
            let target = names.get(rel.target_object_type_id.as_str()).copied().unwrap_or("");
            let name = match rel.name.trim() {
                "" => rel.id.as_str(),
                n => n,
            };
            relation_phrase(source, name, target, &rel.comment)
        })
        .collect()
}

fn relation_phrase(source: &str, name: &str, target: &str, comment: &str) -> String {
    let mut parts = Vec::with_capacity(3);
    if !source.trim().is_empty() {
        parts.push(source.trim().to_string());
    }
    if !name.trim().is_empty() {
        if comment.trim().is_empty() {
            parts.push(name.trim().to_string());
        } else {
            parts.push(format!("{}, {}", name.trim(), comment.trim()));
        }
    }
    if !target.trim().is_empty() {
        parts.push(target.trim().to_string());
    }
    parts.join(" ")
}

/// Stable descending sort by `scores`, writing each score back, then truncate.
fn sort_by_scores(relations: Vec<RelationType>, scores: Vec<f64>, top_k: usize) -> Vec<RelationType> {
    let mut scored: Vec<(RelationType, f64)> = relations.into_iter().zip(scores).collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(top_k)
        .map(|(mut rel, score)| {
            rel.score = score;
            rel
        })
        .collect()
}

fn truncate(mut relations: Vec<RelationType>, top_k: usize) -> Vec<RelationType> {
    if top_k > 0 {
        relations.truncate(top_k);
    }
    relations
}
