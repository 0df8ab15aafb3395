use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::Extensions;
use super::media_type::MediaType;
use super::schema::{Schema, SchemaOrRef, SchemaType, TypeSet};

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    /// OpenAPI 3.2: the whole query string, serialized through `content`.
    Querystring,
    /// Swagger 2.0 request body parameter.
    Body,
    /// Swagger 2.0 form field.
    #[serde(rename = "formData")]
    FormData,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Querystring => "querystring",
            ParameterLocation::Body => "body",
            ParameterLocation::FormData => "formData",
        }
    }
}

/// Swagger 2.0 fields describing a non-body parameter without a `schema`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyParameter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl LegacyParameter {
    pub fn is_empty(&self) -> bool {
        self.type_name.is_none() && self.items.is_none()
    }

    /// An equivalent JSON Schema for the legacy type fields.
    pub fn to_schema(&self) -> Option<Schema> {
        let type_name = self.type_name.clone()?;
        Some(Schema {
            schema_type: Some(TypeSet::Single(type_name)),
            format: self.format.clone(),
            items: self.items.clone(),
            enum_values: self.enum_values.clone(),
            default_value: self.default_value.clone(),
            minimum: self.minimum,
            maximum: self.maximum,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.clone(),
            ..Schema::default()
        })
    }
}

/// An API parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(rename = "allowEmptyValue", skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(rename = "allowReserved", skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(flatten)]
    pub legacy: LegacyParameter,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Parameter {
    /// The `schema`, or one synthesized from Swagger 2.0 type fields.
    pub fn effective_schema(&self) -> Option<SchemaOrRef> {
        self.schema
            .clone()
            .or_else(|| self.legacy.to_schema().map(SchemaOrRef::inline))
    }

    /// Identity used when merging path-item and operation parameters.
    pub fn key(&self) -> (String, ParameterLocation) {
        (self.name.clone(), self.location)
    }
}

/// A reference or inline parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Parameter(Box<Parameter>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_swagger_query_parameter() {
        let p: Parameter = serde_json::from_value(json!({
            "name": "tags",
            "in": "query",
            "type": "array",
            "items": {"type": "string"},
            "collectionFormat": "multi",
            "x-example": "a"
        }))
        .unwrap();
        assert_eq!(p.location, ParameterLocation::Query);
        assert_eq!(p.legacy.collection_format.as_deref(), Some("multi"));
        assert_eq!(p.extensions.get("x-example"), Some(&json!("a")));
        let schema = p.effective_schema().unwrap();
        assert!(schema.as_schema().unwrap().has_type(&SchemaType::Array));
    }

    #[test]
    fn test_form_data_location() {
        let p: Parameter =
            serde_json::from_value(json!({"name": "file", "in": "formData", "type": "file"}))
                .unwrap();
        assert_eq!(p.location, ParameterLocation::FormData);
    }

    #[test]
    fn test_parameter_or_ref() {
        let r: ParameterOrRef =
            serde_json::from_value(json!({"$ref": "#/components/parameters/Limit"})).unwrap();
        assert!(matches!(r, ParameterOrRef::Ref { .. }));
    }
}
