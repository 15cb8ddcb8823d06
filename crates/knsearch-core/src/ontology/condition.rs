//! Query conditions understood by the ontology search endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field wildcard matching every indexed field.
pub const ANY_FIELD: &str = "*";

/// Field carrying the search engine relevance score.
pub const SCORE_FIELD: &str = "_score";

/// Limit key used by knn conditions.
const LIMIT_KEY_K: &str = "k";

/// Condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "match")]
    Match,
    #[serde(rename = "knn")]
    Knn,
}

/// Where a condition value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFrom {
    Const,
}

/// A (possibly compound) query condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<ValueFrom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_value: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_conditions: Vec<Condition>,
}

impl Condition {
    fn leaf(field: &str, operation: Operation, value: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            operation,
            value: Some(Value::String(value.to_string())),
            value_from: Some(ValueFrom::Const),
            limit_key: None,
            limit_value: None,
            sub_conditions: Vec::new(),
        }
    }

    /// Vector nearest-neighbour condition returning at most `k` hits.
    pub fn knn(field: &str, query: &str, k: usize) -> Self {
        Self {
            limit_key: Some(LIMIT_KEY_K.to_string()),
            limit_value: Some(k),
            ..Self::leaf(field, Operation::Knn, query)
        }
    }

    /// Keyword (full text) match condition.
    pub fn keyword(field: &str, query: &str) -> Self {
        Self::leaf(field, Operation::Match, query)
    }

    /// Exact value condition.
    pub fn equal(field: &str, value: &str) -> Self {
        Self::leaf(field, Operation::Equal, value)
    }

    /// OR-combination of `sub_conditions`.
    pub fn or(sub_conditions: Vec<Condition>) -> Self {
        Self {
            field: None,
            operation: Operation::Or,
            value: None,
            value_from: None,
            limit_key: None,
            limit_value: None,
            sub_conditions,
        }
    }
}

/// Sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParams {
    pub field: String,
    pub direction: String,
}

impl SortParams {
    /// Highest relevance first.
    pub fn score_desc() -> Self {
        Self {
            field: SCORE_FIELD.to_string(),
            direction: "desc".to_string(),
        }
    }
}

/// Body of a concept (object/relation type) search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptSearchRequest {
    pub condition: Condition,
    pub sort: Vec<SortParams>,
    pub limit: usize,
    pub need_total: bool,
}

impl ConceptSearchRequest {
    /// Vector-or-keyword search over every field, best hits first.
    pub fn hybrid(query: &str, limit: usize) -> Self {
        Self {
            condition: Condition::or(vec![
                Condition::knn(ANY_FIELD, query, limit),
                Condition::keyword(ANY_FIELD, query),
            ]),
            sort: vec![SortParams::score_desc()],
            limit,
            need_total: false,
        }
    }
}

/// Body of an object instance query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceQueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    pub limit: usize,
    pub need_total: bool,
    pub include_type_info: bool,
    pub include_logic_params: bool,
}

impl InstanceQueryRequest {
    /// Unconditioned query for up to `limit` instances.
    pub fn sample(limit: usize) -> Self {
        Self {
            condition: None,
            limit,
            need_total: false,
            include_type_info: false,
            include_logic_params: false,
        }
    }

    /// Query for up to `limit` instances matching `condition`.
    pub fn matching(condition: Condition, limit: usize) -> Self {
        Self {
            condition: Some(condition),
            ..Self::sample(limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hybrid_request_shape() {
        let req = ConceptSearchRequest::hybrid("supplier", 200);
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["condition"]["operation"], "or");
        assert_eq!(value["condition"]["sub_conditions"][0]["operation"], "knn");
        assert_eq!(value["condition"]["sub_conditions"][0]["limit_key"], "k");
        assert_eq!(value["condition"]["sub_conditions"][0]["limit_value"], 200);
        assert_eq!(value["condition"]["sub_conditions"][1]["operation"], "match");
        assert_eq!(value["sort"][0], json!({"field": "_score", "direction": "desc"}));
        assert_eq!(value["need_total"], false);
    }

    #[test]
    fn test_equal_serializes_as_double_equals() {
        let value = serde_json::to_value(Condition::equal("name", "x")).unwrap();
        assert_eq!(value["operation"], "==");
        assert_eq!(value["value_from"], "const");
        assert!(value.get("sub_conditions").is_none());
    }

    #[test]
    fn test_sample_request_has_no_condition() {
        let value = serde_json::to_value(InstanceQueryRequest::sample(1)).unwrap();
        assert!(value.get("condition").is_none());
        assert_eq!(value["limit"], 1);
    }
}
