use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::Extensions;
use super::link::{CallbackOrRef, LinkOrRef};
use super::operation::PathItem;
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::schema::SchemaOrRef;
use super::security::SecuritySchemeOrRef;

/// Components object holding reusable definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, serde_json::Value>,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,

    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, SecuritySchemeOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, LinkOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackOrRef>,

    #[serde(
        rename = "pathItems",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub path_items: IndexMap<String, PathItem>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Which `components` map a local reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Schemas,
    Responses,
    Parameters,
    RequestBodies,
    SecuritySchemes,
    Links,
    Callbacks,
    PathItems,
}

impl ComponentKind {
    /// Split `#/components/<kind>/<name>` (or a Swagger 2.0 root section)
    /// into its kind and decoded name.
    pub fn parse_local_ref(ref_path: &str) -> Option<(ComponentKind, String)> {
        let fragment = ref_path.strip_prefix("#/")?;
        let mut parts = fragment.splitn(3, '/');
        let first = parts.next()?;
        let (section, name) = if first == "components" {
            (parts.next()?, parts.next()?)
        } else {
            (first, parts.next()?)
        };
        if name.contains('/') {
            return None;
        }
        let kind = match section {
            "schemas" | "definitions" => ComponentKind::Schemas,
            "responses" => ComponentKind::Responses,
            "parameters" => ComponentKind::Parameters,
            "requestBodies" => ComponentKind::RequestBodies,
            "securitySchemes" | "securityDefinitions" => ComponentKind::SecuritySchemes,
            "links" => ComponentKind::Links,
            "callbacks" => ComponentKind::Callbacks,
            "pathItems" => ComponentKind::PathItems,
            _ => return None,
        };
        Some((kind, crate::resolve::pointer::decode_pointer_segment(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_ref() {
        assert_eq!(
            ComponentKind::parse_local_ref("#/components/parameters/Limit"),
            Some((ComponentKind::Parameters, "Limit".to_string()))
        );
        assert_eq!(
            ComponentKind::parse_local_ref("#/definitions/Pet"),
            Some((ComponentKind::Schemas, "Pet".to_string()))
        );
        assert_eq!(
            ComponentKind::parse_local_ref("#/components/schemas/a~1b"),
            Some((ComponentKind::Schemas, "a/b".to_string()))
        );
        assert_eq!(ComponentKind::parse_local_ref("other.yaml#/x"), None);
        assert_eq!(
            ComponentKind::parse_local_ref("#/components/schemas/Pet/properties/id"),
            None
        );
    }
}
