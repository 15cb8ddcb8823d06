//! Default values for knsearch configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Service Defaults
// ============================================================================

/// Default ontology-manager base URL.
pub const DEFAULT_ONTOLOGY_MANAGER_URL: &str = "http://ontology-manager:13014";

/// Default ontology-query base URL.
pub const DEFAULT_ONTOLOGY_QUERY_URL: &str = "http://ontology-query:13018";

/// Default account type sent with ontology requests.
pub const DEFAULT_ACCOUNT_TYPE: &str = "user";

/// Default rerank endpoint.
pub const DEFAULT_RERANK_URL: &str = "http://mf-model-api:9898/api/private/mf-model-api/v1/small-model/reranker";

/// Default rerank model name.
pub const DEFAULT_RERANK_MODEL: &str = "reranker";

// ============================================================================
// Concept Retrieval Defaults
// ============================================================================

/// Number of relation types kept after ranking.
pub const DEFAULT_TOP_K: usize = 10;

/// Coarse recall is only attempted on networks with at least this many relation types.
pub const DEFAULT_COARSE_MIN_RELATION_COUNT: usize = 5000;

/// Cap on object types returned by the coarse object search.
pub const DEFAULT_COARSE_OBJECT_LIMIT: usize = 200;

/// Cap on relation types returned by the coarse relation search.
pub const DEFAULT_COARSE_RELATION_LIMIT: usize = 500;

/// Properties kept per object type, per kind (data/logic).
pub const DEFAULT_PER_OBJECT_PROPERTY_TOP_K: usize = 8;

/// Properties kept across all selected object types.
pub const DEFAULT_GLOBAL_PROPERTY_TOP_K: usize = 50;

/// Object types kept relative to `top_k` (and to the ranked relation count).
pub const OBJECT_TYPE_RELATION_MULTIPLIER: usize = 2;

// ============================================================================
// Instance Retrieval Defaults
// ============================================================================

/// Candidates fetched per object type before scoring.
pub const DEFAULT_INITIAL_CANDIDATE_COUNT: usize = 50;

/// Instances kept per object type after scoring.
pub const DEFAULT_PER_TYPE_INSTANCE_LIMIT: usize = 5;

/// Maximum sub-conditions in one semantic OR condition.
pub const DEFAULT_MAX_SEMANTIC_SUB_CONDITIONS: usize = 10;

/// Nodes scoring below this are dropped per type.
pub const DEFAULT_MIN_DIRECT_RELEVANCE: f64 = 0.1;

/// Fraction of the best score a node must reach to survive aggregation.
pub const DEFAULT_GLOBAL_FINAL_SCORE_RATIO: f64 = 0.25;

/// Score assigned to an instance whose name equals the query.
pub const DEFAULT_EXACT_NAME_MATCH_SCORE: f64 = 1.0;

/// Properties kept per returned instance.
pub const DEFAULT_MAX_PROPERTIES_PER_INSTANCE: usize = 20;

/// Characters kept from a string property value.
pub const DEFAULT_MAX_PROPERTY_VALUE_LENGTH: usize = 200;

/// Concurrent per-type instance queries.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Suffix appended to truncated property values.
pub const TRUNCATION_SUFFIX: &str = "...";
