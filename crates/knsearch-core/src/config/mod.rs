//! Configuration management for knsearch.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `knsearch.toml` file
//! 3. User config `~/.config/knsearch/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! Per-request tuning arrives as [`RetrievalOverrides`] and is merged field by
//! field over the loaded [`RetrievalConfig`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse YAML config file: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ontology service endpoints.
    pub ontology: OntologyConfig,

    /// Rerank service configuration.
    pub rerank: RerankConfig,

    /// Retrieval knobs used when a request does not override them.
    pub retrieval: RetrievalConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./knsearch.toml` (project local)
    /// 2. `~/.config/knsearch/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("knsearch.toml").exists() {
            return Self::from_file("knsearch.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("knsearch").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.retrieval = config.retrieval.normalized();
        Ok(config)
    }

    /// Load configuration from a specific file.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let mut config: Config = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.apply_env_overrides();
        config.retrieval = config.retrieval.normalized();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KNSEARCH_ONTOLOGY_MANAGER_URL") {
            self.ontology.manager_url = url;
        }
        if let Ok(url) = std::env::var("KNSEARCH_ONTOLOGY_QUERY_URL") {
            self.ontology.query_url = url;
        }
        if let Ok(account) = std::env::var("KNSEARCH_ACCOUNT_ID") {
            self.ontology.account_id = Some(account);
        }

        if let Ok(url) = std::env::var("KNSEARCH_RERANK_URL") {
            self.rerank.url = url;
        }
        if let Ok(model) = std::env::var("KNSEARCH_RERANK_MODEL") {
            self.rerank.model = model;
        }
        if let Ok(key) = std::env::var("KNSEARCH_RERANK_API_KEY") {
            self.rerank.api_key = Some(key);
        }

        if let Ok(top_k) = std::env::var("KNSEARCH_TOP_K") {
            if let Ok(n) = top_k.parse() {
                self.retrieval.top_k = n;
            }
        }
    }

    /// Reject values no default can repair.
    fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.retrieval.global_final_score_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Invalid(format!(
                "retrieval.global_final_score_ratio must be within [0, 1], got {}",
                ratio
            )));
        }
        if self.ontology.manager_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ontology.manager_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Ontology service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OntologyConfig {
    /// Base URL of the ontology-manager service (schema detail, concept search).
    pub manager_url: String,

    /// Base URL of the ontology-query service (object instances).
    pub query_url: String,

    /// Account id forwarded with every request.
    pub account_id: Option<String>,

    /// Account type forwarded with every request.
    pub account_type: String,
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            manager_url: DEFAULT_ONTOLOGY_MANAGER_URL.to_string(),
            query_url: DEFAULT_ONTOLOGY_QUERY_URL.to_string(),
            account_id: None,
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
        }
    }
}

/// Rerank service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Full URL of the rerank endpoint.
    pub url: String,

    /// Model name sent with each rerank call.
    pub model: String,

    /// API key (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RERANK_URL.to_string(),
            model: DEFAULT_RERANK_MODEL.to_string(),
            api_key: None,
        }
    }
}

/// Fully resolved retrieval knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Relation types kept after ranking.
    pub top_k: usize,

    /// Whether coarse recall may run on large networks.
    pub enable_coarse_recall: bool,

    /// Relation count at which coarse recall kicks in.
    pub coarse_min_relation_count: usize,

    /// Object types requested from the coarse search.
    pub coarse_object_limit: usize,

    /// Relation types requested from the coarse search.
    pub coarse_relation_limit: usize,

    /// Data (and separately logic) properties kept per object type.
    pub per_object_property_top_k: usize,

    /// Properties kept across all object types.
    pub global_property_top_k: usize,

    /// Omit heavy, low-signal fields from returned concepts.
    pub schema_brief: bool,

    /// Attach one sample instance to every selected object type.
    pub include_sample_data: bool,

    /// Candidates fetched per object type.
    pub initial_candidate_count: usize,

    /// Instances kept per object type.
    pub per_type_instance_limit: usize,

    /// Maximum sub-conditions in a semantic instance query.
    pub max_semantic_sub_conditions: usize,

    /// Minimum score for an instance to survive per-type filtering.
    pub min_direct_relevance: f64,

    /// Whether the cross-type score ratio filter runs.
    pub enable_global_final_score_ratio: bool,

    /// Fraction of the best score a node must reach.
    pub global_final_score_ratio: f64,

    /// Score for an instance whose name equals the query.
    pub exact_name_match_score: f64,

    /// Whether returned instance properties are capped and truncated.
    pub enable_property_filter: bool,

    /// Properties kept per instance.
    pub max_properties_per_instance: usize,

    /// Characters kept per string property value.
    pub max_property_value_length: usize,

    /// Concurrent per-type instance queries.
    pub max_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            enable_coarse_recall: true,
            coarse_min_relation_count: DEFAULT_COARSE_MIN_RELATION_COUNT,
            coarse_object_limit: DEFAULT_COARSE_OBJECT_LIMIT,
            coarse_relation_limit: DEFAULT_COARSE_RELATION_LIMIT,
            per_object_property_top_k: DEFAULT_PER_OBJECT_PROPERTY_TOP_K,
            global_property_top_k: DEFAULT_GLOBAL_PROPERTY_TOP_K,
            schema_brief: false,
            include_sample_data: false,
            initial_candidate_count: DEFAULT_INITIAL_CANDIDATE_COUNT,
            per_type_instance_limit: DEFAULT_PER_TYPE_INSTANCE_LIMIT,
            max_semantic_sub_conditions: DEFAULT_MAX_SEMANTIC_SUB_CONDITIONS,
            min_direct_relevance: DEFAULT_MIN_DIRECT_RELEVANCE,
            enable_global_final_score_ratio: true,
            global_final_score_ratio: DEFAULT_GLOBAL_FINAL_SCORE_RATIO,
            exact_name_match_score: DEFAULT_EXACT_NAME_MATCH_SCORE,
            enable_property_filter: true,
            max_properties_per_instance: DEFAULT_MAX_PROPERTIES_PER_INSTANCE,
            max_property_value_length: DEFAULT_MAX_PROPERTY_VALUE_LENGTH,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl RetrievalConfig {
    /// Replace every zero numeric knob with its documented default.
    pub fn normalized(self) -> Self {
        RetrievalOverrides::default().merge_over(&self)
    }

    /// Merge per-request overrides over this config.
    pub fn with_overrides(&self, overrides: Option<&RetrievalOverrides>) -> Self {
        match overrides {
            Some(o) => o.merge_over(self),
            None => self.clone().normalized(),
        }
    }
}

/// Per-request retrieval overrides.
///
/// An absent or zero numeric override keeps the base value; the whole struct
/// is never substituted for the base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalOverrides {
    pub top_k: Option<usize>,
    pub enable_coarse_recall: Option<bool>,
    pub coarse_min_relation_count: Option<usize>,
    pub coarse_object_limit: Option<usize>,
    pub coarse_relation_limit: Option<usize>,
    pub per_object_property_top_k: Option<usize>,
    pub global_property_top_k: Option<usize>,
    pub schema_brief: Option<bool>,
    pub include_sample_data: Option<bool>,
    pub initial_candidate_count: Option<usize>,
    pub per_type_instance_limit: Option<usize>,
    pub max_semantic_sub_conditions: Option<usize>,
    pub min_direct_relevance: Option<f64>,
    pub enable_global_final_score_ratio: Option<bool>,
    pub global_final_score_ratio: Option<f64>,
    pub exact_name_match_score: Option<f64>,
    pub enable_property_filter: Option<bool>,
    pub max_properties_per_instance: Option<usize>,
    pub max_property_value_length: Option<usize>,
    pub max_concurrency: Option<usize>,
}

impl RetrievalOverrides {
    /// Merge these overrides over `base`, field by field.
    ///
    /// A zero in `base` itself falls back to the built-in default, so the
    /// result never carries a zero numeric knob.
    pub fn merge_over(&self, base: &RetrievalConfig) -> RetrievalConfig {
        RetrievalConfig {
            top_k: pick(self.top_k, base.top_k, DEFAULT_TOP_K),
            enable_coarse_recall: self.enable_coarse_recall.unwrap_or(base.enable_coarse_recall),
            coarse_min_relation_count: pick(
                self.coarse_min_relation_count,
                base.coarse_min_relation_count,
                DEFAULT_COARSE_MIN_RELATION_COUNT,
            ),
            coarse_object_limit: pick(
                self.coarse_object_limit,
                base.coarse_object_limit,
                DEFAULT_COARSE_OBJECT_LIMIT,
            ),
            coarse_relation_limit: pick(
                self.coarse_relation_limit,
                base.coarse_relation_limit,
                DEFAULT_COARSE_RELATION_LIMIT,
            ),
            per_object_property_top_k: pick(
                self.per_object_property_top_k,
                base.per_object_property_top_k,
                DEFAULT_PER_OBJECT_PROPERTY_TOP_K,
            ),
            global_property_top_k: pick(
                self.global_property_top_k,
                base.global_property_top_k,
                DEFAULT_GLOBAL_PROPERTY_TOP_K,
            ),
            schema_brief: self.schema_brief.unwrap_or(base.schema_brief),
            include_sample_data: self.include_sample_data.unwrap_or(base.include_sample_data),
            initial_candidate_count: pick(
                self.initial_candidate_count,
                base.initial_candidate_count,
                DEFAULT_INITIAL_CANDIDATE_COUNT,
            ),
            per_type_instance_limit: pick(
                self.per_type_instance_limit,
                base.per_type_instance_limit,
                DEFAULT_PER_TYPE_INSTANCE_LIMIT,
            ),
            max_semantic_sub_conditions: pick(
                self.max_semantic_sub_conditions,
                base.max_semantic_sub_conditions,
                DEFAULT_MAX_SEMANTIC_SUB_CONDITIONS,
            ),
            min_direct_relevance: pick_f64(
                self.min_direct_relevance,
                base.min_direct_relevance,
                DEFAULT_MIN_DIRECT_RELEVANCE,
            ),
            enable_global_final_score_ratio: self
                .enable_global_final_score_ratio
                .unwrap_or(base.enable_global_final_score_ratio),
            global_final_score_ratio: pick_f64(
                self.global_final_score_ratio,
                base.global_final_score_ratio,
                DEFAULT_GLOBAL_FINAL_SCORE_RATIO,
            ),
            exact_name_match_score: pick_f64(
                self.exact_name_match_score,
                base.exact_name_match_score,
                DEFAULT_EXACT_NAME_MATCH_SCORE,
            ),
            enable_property_filter: self
                .enable_property_filter
                .unwrap_or(base.enable_property_filter),
            max_properties_per_instance: pick(
                self.max_properties_per_instance,
                base.max_properties_per_instance,
                DEFAULT_MAX_PROPERTIES_PER_INSTANCE,
            ),
            max_property_value_length: pick(
                self.max_property_value_length,
                base.max_property_value_length,
                DEFAULT_MAX_PROPERTY_VALUE_LENGTH,
            ),
            max_concurrency: pick(
                self.max_concurrency,
                base.max_concurrency,
                DEFAULT_MAX_CONCURRENCY,
            ),
        }
    }
}

fn pick(over: Option<usize>, base: usize, default: usize) -> usize {
    match over {
        Some(v) if v > 0 => v,
        _ if base > 0 => base,
        _ => default,
    }
}

fn pick_f64(over: Option<f64>, base: f64, default: f64) -> f64 {
    match over {
        Some(v) if v > 0.0 => v,
        _ if base > 0.0 => base,
        _ => default,
    }
}
