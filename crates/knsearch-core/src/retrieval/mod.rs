//! Two-stage retrieval over a knowledge network.
//!
//! Concept retrieval picks the schema subset that matters for a query:
//! - [`CoarseRecallFilter`] - index-backed pre-filter for very large networks
//! - [`RelationRanker`] - rerank or lexical ordering of relation types
//! - [`select_object_types`] - relation adjacency plus score backfill
//! - [`prune_properties`] - per-object and global property quotas
//!
//! Instance retrieval then queries the selected object types through their
//! searchable fields and scores what comes back
//! ([`SemanticInstanceRetriever`]).

mod coarse;
mod concept;
mod fields;
mod instance;
mod models;
mod pruner;
mod relation;
mod scoring;
mod selector;

pub use coarse::CoarseRecallFilter;
pub use concept::ConceptRetriever;
pub use fields::{is_textual, searchable_fields, SearchableField};
pub use instance::{
    aggregate_nodes, apply_score_ratio, build_semantic_condition, rank_nodes, redact_properties,
    score_nodes, to_node, InstanceError, InstanceRetrieval, SemanticInstanceRetriever,
    NO_MATCHING_INSTANCES_MESSAGE, NO_SEARCHABLE_FIELDS_MESSAGE,
};
pub use models::{
    ActionTypeConcept, Concept, ConceptResult, ConceptRetrieval, DataPropertyConcept,
    LogicPropertyConcept, Node, ObjectTypeConcept, RelationTypeConcept,
};
pub use pruner::prune_properties;
pub use relation::{rank_by_simple_match, render_relations, RelationRanker};
pub use scoring::{instance_name_score, simple_match};
pub use selector::select_object_types;
