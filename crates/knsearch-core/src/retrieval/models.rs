//! Output shapes of concept and instance retrieval.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ontology::{ActionType, ObjectType, RelationType};

const OBJECT_CONCEPT_TYPE: &str = "object_type";
const RELATION_CONCEPT_TYPE: &str = "relation_type";

fn is_zero(score: &f64) -> bool {
    *score == 0.0
}

/// A data property as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPropertyConcept {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_operations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A logic property as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicPropertyConcept {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A selected object type.
///
/// In brief mode `concept_type`, tags, data source, primary keys and property
/// comments are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeConcept {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_type: Option<String>,
    pub concept_id: String,
    pub concept_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_properties: Vec<DataPropertyConcept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logic_properties: Vec<LogicPropertyConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<Map<String, Value>>,
}

impl ObjectTypeConcept {
    pub fn from_object_type(obj: &ObjectType, brief: bool) -> Self {
        let data_properties = obj
            .data_properties
            .iter()
            .map(|p| DataPropertyConcept {
                name: p.name.clone(),
                property_type: p.property_type.clone(),
                condition_operations: p.condition_operations.clone(),
                comment: (!brief).then(|| p.comment.clone()),
            })
            .collect();

        let logic_properties = obj
            .logic_properties
            .iter()
            .map(|p| LogicPropertyConcept {
                name: p.name.clone(),
                property_type: p.property_type.clone(),
                comment: (!brief).then(|| p.comment.clone()),
                data_source: p.data_source.clone(),
                parameters: p.parameters.clone(),
            })
            .collect();

        Self {
            concept_type: (!brief).then(|| OBJECT_CONCEPT_TYPE.to_string()),
            concept_id: obj.id.clone(),
            concept_name: obj.name.clone(),
            comment: obj.comment.clone(),
            score: obj.score,
            tags: if brief { Vec::new() } else { obj.tags.clone() },
            data_source: if brief { None } else { obj.data_source.clone() },
            primary_keys: if brief {
                Vec::new()
            } else {
                obj.primary_keys.clone()
            },
            data_properties,
            logic_properties,
            sample_data: None,
        }
    }
}

/// A ranked relation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTypeConcept {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_type: Option<String>,
    pub concept_id: String,
    pub concept_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub score: f64,
    pub source_object_type_id: String,
    pub target_object_type_id: String,
}

impl RelationTypeConcept {
    pub fn from_relation_type(rel: &RelationType, brief: bool) -> Self {
        Self {
            concept_type: (!brief).then(|| RELATION_CONCEPT_TYPE.to_string()),
            concept_id: rel.id.clone(),
            concept_name: rel.name.clone(),
            comment: (!brief).then(|| rel.comment.clone()),
            score: rel.score,
            source_object_type_id: rel.source_object_type_id.clone(),
            target_object_type_id: rel.target_object_type_id.clone(),
        }
    }
}

/// An action type, passed through with its owner's name attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTypeConcept {
    pub id: String,
    pub name: String,
    pub object_type_id: String,
    #[serde(default)]
    pub object_type_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub kn_id: String,
}

impl ActionTypeConcept {
    pub fn from_action_type(act: &ActionType, kn_id: &str, object_type_name: &str) -> Self {
        Self {
            id: act.id.clone(),
            name: act.name.clone(),
            object_type_id: act.object_type_id.clone(),
            object_type_name: object_type_name.to_string(),
            comment: act.comment.clone(),
            tags: act.tags.clone(),
            kn_id: kn_id.to_string(),
        }
    }
}

/// Any schema-level concept, keyed by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Concept {
    Object(ObjectTypeConcept),
    Relation(RelationTypeConcept),
    Action(ActionTypeConcept),
}

impl Concept {
    pub fn id(&self) -> &str {
        match self {
            Concept::Object(o) => &o.concept_id,
            Concept::Relation(r) => &r.concept_id,
            Concept::Action(a) => &a.id,
        }
    }
}

/// A concept paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptResult {
    pub concept: Concept,
    pub score: f64,
}

/// A scored data instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub object_type_id: String,
    pub object_type_name: String,
    #[serde(default)]
    pub unique_identities: Map<String, Value>,
    #[serde(default)]
    pub instance_name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub score: f64,
}

/// Schema-level result of concept retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptRetrieval {
    pub object_types: Vec<ObjectTypeConcept>,
    pub relation_types: Vec<RelationTypeConcept>,
    pub action_types: Vec<ActionTypeConcept>,
    /// Selected object types in their unconverted form, for instance retrieval.
    #[serde(skip)]
    pub selected: Vec<ObjectType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::DataProperty;

    fn order_type() -> ObjectType {
        ObjectType {
            id: "ot_order".to_string(),
            name: "Order".to_string(),
            comment: "purchase order".to_string(),
            score: 0.7,
            tags: vec!["sales".to_string()],
            primary_keys: vec!["order_no".to_string()],
            data_properties: vec![DataProperty {
                name: "order_no".to_string(),
                comment: "order number".to_string(),
                property_type: "string".to_string(),
                condition_operations: vec!["==".to_string()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_full_object_keeps_detail() {
        let concept = ObjectTypeConcept::from_object_type(&order_type(), false);
        assert_eq!(concept.concept_type.as_deref(), Some("object_type"));
        assert_eq!(concept.primary_keys, vec!["order_no"]);
        assert_eq!(concept.data_properties[0].comment.as_deref(), Some("order number"));
    }

    #[test]
    fn test_brief_object_drops_detail() {
        let concept = ObjectTypeConcept::from_object_type(&order_type(), true);
        assert!(concept.concept_type.is_none());
        assert!(concept.tags.is_empty());
        assert!(concept.primary_keys.is_empty());
        assert!(concept.data_properties[0].comment.is_none());
        // operators survive brief mode
        assert_eq!(concept.data_properties[0].condition_operations, vec!["=="]);

        let json = serde_json::to_value(&concept).unwrap();
        assert!(json.get("concept_type").is_none());
        assert!(json.get("primary_keys").is_none());
    }

    #[test]
    fn test_brief_relation_drops_comment() {
        let rel = RelationType {
            id: "rt_1".to_string(),
            name: "places".to_string(),
            comment: "customer places order".to_string(),
            ..Default::default()
        };
        let brief = RelationTypeConcept::from_relation_type(&rel, true);
        assert!(brief.comment.is_none());
        assert!(brief.concept_type.is_none());

        let full = RelationTypeConcept::from_relation_type(&rel, false);
        assert_eq!(full.comment.as_deref(), Some("customer places order"));
    }

    #[test]
    fn test_concept_union_is_tagged_by_kind() {
        let concept = Concept::Relation(RelationTypeConcept::from_relation_type(
            &RelationType {
                id: "rt_9".to_string(),
                ..Default::default()
            },
            true,
        ));
        let json = serde_json::to_value(&concept).unwrap();
        assert_eq!(json["kind"], "relation");
        assert_eq!(json["detail"]["concept_id"], "rt_9");
        assert_eq!(concept.id(), "rt_9");
    }
}
