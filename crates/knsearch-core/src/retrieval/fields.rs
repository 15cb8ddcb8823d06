//! Semantic field selection for instance retrieval.

use crate::ontology::{DataProperty, ObjectType};

const TEXTUAL_TYPES: [&str; 4] = ["text", "string", "varchar", "char"];

/// A property that can carry a semantic instance query, with the operators
/// the store supports for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableField {
    pub name: String,
    pub knn: bool,
    pub keyword: bool,
    pub equal: bool,
}

/// Searchable data properties of `object_type`, in declaration order.
///
/// An empty result means the type cannot be queried semantically and is
/// skipped.
pub fn searchable_fields(object_type: &ObjectType) -> Vec<SearchableField> {
    object_type
        .data_properties
        .iter()
        .filter_map(searchable_field)
        .collect()
}

fn searchable_field(property: &DataProperty) -> Option<SearchableField> {
    if property.name.trim().is_empty() || !is_textual(&property.property_type) {
        return None;
    }

    let mut field = SearchableField {
        name: property.name.clone(),
        knn: false,
        keyword: false,
        equal: false,
    };
    for op in &property.condition_operations {
        match op.trim().to_lowercase().as_str() {
            "knn" => field.knn = true,
            "match" => field.keyword = true,
            "==" | "equal" | "eq" => field.equal = true,
            _ => {}
        }
    }

    (field.knn || field.keyword || field.equal).then_some(field)
}

/// Whether a declared property type holds text, including arrays of text.
pub fn is_textual(property_type: &str) -> bool {
    let ty = property_type.trim().to_lowercase();
    let element = if let Some(inner) = ty.strip_prefix("array<").and_then(|t| t.strip_suffix('>')) {
        inner
    } else if let Some(inner) = ty.strip_prefix("array(").and_then(|t| t.strip_suffix(')')) {
        inner
    } else if let Some(inner) = ty.strip_suffix("[]") {
        inner
    } else {
        ty.as_str()
    };

    // varchar(255), char(8)
    let base = match element.find('(') {
        Some(pos) => &element[..pos],
        None => element,
    };
    TEXTUAL_TYPES.contains(&base.trim())
}
