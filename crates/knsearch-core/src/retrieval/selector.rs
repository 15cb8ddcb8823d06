//! Object type selection by relation adjacency plus score backfill.

use std::collections::HashSet;

use crate::config::OBJECT_TYPE_RELATION_MULTIPLIER;
use crate::ontology::{ObjectType, RelationType};

/// Choose the object types that survive concept retrieval.
///
/// Endpoints of the ranked `relations` come first, in their original order.
/// The remaining slots up to `max(relations * 2, top_k)` are filled by score:
/// positively scored types best first, then unscored types in original order.
/// Without relations the whole list is ranked that way and capped at
/// `top_k * 2`.
pub fn select_object_types(
    object_types: Vec<ObjectType>,
    relations: &[RelationType],
    top_k: usize,
) -> Vec<ObjectType> {
    if object_types.is_empty() {
        return object_types;
    }

    if relations.is_empty() {
        let mut ranked = rank_by_score(object_types);
        ranked.truncate(top_k.saturating_mul(OBJECT_TYPE_RELATION_MULTIPLIER));
        return ranked;
    }

    let endpoints: HashSet<&str> = relations
        .iter()
        .flat_map(|rel| {
            [
                rel.source_object_type_id.as_str(),
                rel.target_object_type_id.as_str(),
            ]
        })
        .filter(|id| !id.is_empty())
        .collect();

    let (mut selected, rest): (Vec<_>, Vec<_>) = object_types
        .into_iter()
        .partition(|obj| endpoints.contains(obj.id.as_str()));

    let max_object_count = (relations.len() * OBJECT_TYPE_RELATION_MULTIPLIER).max(top_k);
    if selected.len() >= max_object_count {
        return selected;
    }

    let room = max_object_count - selected.len();
    selected.extend(rank_by_score(rest).into_iter().take(room));
    selected
}

/// Positively scored types by descending score, then the unscored ones.
/// Both groups keep their input order on ties.
fn rank_by_score(object_types: Vec<ObjectType>) -> Vec<ObjectType> {
    let (mut scored, unscored): (Vec<_>, Vec<_>) =
        object_types.into_iter().partition(|obj| obj.score > 0.0);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.extend(unscored);
    scored
}
