//! Property pruning under per-object and global quotas.

use std::collections::HashSet;

use super::models::ObjectTypeConcept;
use super::scoring::simple_match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PropertyKind {
    Data,
    Logic,
}

struct Candidate {
    object: usize,
    kind: PropertyKind,
    property: usize,
    score: f64,
}

/// Trim the data and logic properties of `objects` in place.
///
/// Every property is scored against `query` by name and comment, then kept
/// greedily from the best down while its object still has room for that
/// kind (`per_object_top_k`) and the global budget (`global_top_k`) is not
/// exhausted. Kept properties stay in their original order.
pub fn prune_properties(
    objects: &mut [ObjectTypeConcept],
    query: &str,
    per_object_top_k: usize,
    global_top_k: usize,
) {
    let mut candidates = Vec::new();
    for (object, concept) in objects.iter().enumerate() {
        for (property, prop) in concept.data_properties.iter().enumerate() {
            candidates.push(Candidate {
                object,
                kind: PropertyKind::Data,
                property,
                score: simple_match(query, &prop.name, prop.comment.as_deref().unwrap_or("")),
            });
        }
        for (property, prop) in concept.logic_properties.iter().enumerate() {
            candidates.push(Candidate {
                object,
                kind: PropertyKind::Logic,
                property,
                score: simple_match(query, &prop.name, prop.comment.as_deref().unwrap_or("")),
            });
        }
    }

    // ties keep object-then-property order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut local = vec![[0usize; 2]; objects.len()];
    let mut global = 0usize;
    let mut keep: HashSet<(usize, PropertyKind, usize)> = HashSet::new();

    for candidate in candidates {
        if global >= global_top_k {
            break;
        }
        let slot = &mut local[candidate.object][candidate.kind as usize];
        if *slot >= per_object_top_k {
            continue;
        }
        *slot += 1;
        global += 1;
        keep.insert((candidate.object, candidate.kind, candidate.property));
    }

    for (object, concept) in objects.iter_mut().enumerate() {
        let mut index = 0;
        concept.data_properties.retain(|_| {
            let kept = keep.contains(&(object, PropertyKind::Data, index));
            index += 1;
            kept
        });

        let mut index = 0;
        concept.logic_properties.retain(|_| {
            let kept = keep.contains(&(object, PropertyKind::Logic, index));
            index += 1;
            kept
        });
    }
}
