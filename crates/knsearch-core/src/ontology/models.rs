//! Schema and instance payloads exchanged with the ontology services.
//!
//! The services omit empty fields or send them as JSON `null`; both decode
//! to the field's default. Scored payloads may carry a relevance score under
//! `score`, `_score` or both, and `_score` wins when present.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a missing or `null` value as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A physical property of an object type, backed by a store column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataProperty {
    /// Property name (store field name).
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Human readable description.
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    /// Declared value type, e.g. `string`, `integer`, `array<text>`.
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub property_type: String,
    /// Query operators the backing store supports for this property.
    #[serde(deserialize_with = "null_as_default")]
    pub condition_operations: Vec<String>,
}

/// A computed property (metric or operator) of an object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicProperty {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub property_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub condition_operations: Vec<String>,
    /// Where the value is computed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<Value>,
    /// Parameters the computation accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// An object type: a node kind of the knowledge network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ObjectTypeWire")]
pub struct ObjectType {
    pub id: String,
    pub name: String,
    pub comment: String,
    /// External relevance score; zero means "not scored".
    pub score: f64,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<Value>,
    pub data_properties: Vec<DataProperty>,
    pub logic_properties: Vec<LogicProperty>,
    pub primary_keys: Vec<String>,
}

impl ObjectType {
    /// Display name, falling back to the id when the name is blank.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            &self.id
        } else {
            name
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ObjectTypeWire {
    #[serde(deserialize_with = "null_as_default")]
    id: String,
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    comment: String,
    #[serde(deserialize_with = "null_as_default")]
    score: f64,
    #[serde(rename = "_score")]
    engine_score: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    tags: Vec<String>,
    data_source: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    data_properties: Vec<DataProperty>,
    #[serde(deserialize_with = "null_as_default")]
    logic_properties: Vec<LogicProperty>,
    #[serde(deserialize_with = "null_as_default")]
    primary_keys: Vec<String>,
}

impl From<ObjectTypeWire> for ObjectType {
    fn from(wire: ObjectTypeWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            comment: wire.comment,
            score: wire.engine_score.unwrap_or(wire.score),
            tags: wire.tags,
            data_source: wire.data_source,
            data_properties: wire.data_properties,
            logic_properties: wire.logic_properties,
            primary_keys: wire.primary_keys,
        }
    }
}

/// A relation type: a directed edge between two object types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RelationTypeWire")]
pub struct RelationType {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub score: f64,
    pub source_object_type_id: String,
    pub target_object_type_id: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RelationTypeWire {
    #[serde(deserialize_with = "null_as_default")]
    id: String,
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    comment: String,
    #[serde(deserialize_with = "null_as_default")]
    score: f64,
    #[serde(rename = "_score")]
    engine_score: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    source_object_type_id: String,
    #[serde(deserialize_with = "null_as_default")]
    target_object_type_id: String,
}

impl From<RelationTypeWire> for RelationType {
    fn from(wire: RelationTypeWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            comment: wire.comment,
            score: wire.engine_score.unwrap_or(wire.score),
            source_object_type_id: wire.source_object_type_id,
            target_object_type_id: wire.target_object_type_id,
        }
    }
}

/// An action type bound to an object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionType {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object_type_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Full schema of one knowledge network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeNetworkDetail {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object_types: Vec<ObjectType>,
    #[serde(deserialize_with = "null_as_default")]
    pub relation_types: Vec<RelationType>,
    #[serde(deserialize_with = "null_as_default")]
    pub action_types: Vec<ActionType>,
}

/// A concept hit returned by the concept search index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoredConceptWire")]
pub struct ScoredConcept {
    pub id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ScoredConceptWire {
    #[serde(deserialize_with = "null_as_default")]
    id: String,
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    score: f64,
    #[serde(rename = "_score")]
    engine_score: Option<f64>,
}

impl From<ScoredConceptWire> for ScoredConcept {
    fn from(wire: ScoredConceptWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            score: wire.engine_score.unwrap_or(wire.score),
        }
    }
}

/// Concept search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptEntries {
    #[serde(deserialize_with = "null_as_default")]
    pub entries: Vec<ScoredConcept>,
}

/// Object instance query response. Each entry is a raw instance document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectInstances {
    #[serde(rename = "datas", deserialize_with = "null_as_default")]
    pub data: Vec<Value>,
}
