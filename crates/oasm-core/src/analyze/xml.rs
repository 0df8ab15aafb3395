use indexmap::IndexMap;
use serde::Serialize;

use crate::parse::schema::{Schema, SchemaOrRef, SchemaType, ref_target_name};
use crate::resolve::{ReferenceResolver, inline_schema};

const MAX_XML_DEPTH: usize = 16;

/// XML serialization settings of a schema and, recursively, its properties
/// and array items.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub attribute: bool,
    pub wrapped: bool,
    /// `element`, `attribute`, `text`, `cdata` or `none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, XmlConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<XmlConfig>>,
}

/// Element name for a body schema: `xml.name`, else the referenced schema's
/// name, else `root`.
pub fn root_name(schema: &SchemaOrRef, resolver: Option<&ReferenceResolver<'_>>) -> String {
    let declared = inline_schema(schema, resolver)
        .and_then(|s| s.xml)
        .and_then(|xml| xml.name);
    declared
        .or_else(|| schema.ref_path().map(ref_target_name))
        .unwrap_or_else(|| "root".to_string())
}

/// Build the XML configuration tree of a schema.
pub fn xml_config(
    schema: &SchemaOrRef,
    name: &str,
    resolver: Option<&ReferenceResolver<'_>>,
) -> XmlConfig {
    build(schema, name, resolver, 0)
}

fn build(
    schema: &SchemaOrRef,
    name: &str,
    resolver: Option<&ReferenceResolver<'_>>,
    depth: usize,
) -> XmlConfig {
    let Some(resolved) = inline_schema(schema, resolver) else {
        return XmlConfig {
            name: name.to_string(),
            ..XmlConfig::default()
        };
    };
    let mut config = annotate(&resolved, name);
    if depth >= MAX_XML_DEPTH {
        return config;
    }

    for (key, prop) in merged_properties(&resolved, resolver) {
        let child = build(&prop, &key, resolver, depth + 1);
        config.properties.insert(key, child);
    }
    if resolved.has_type(&SchemaType::Array) {
        if let Some(items) = &resolved.items {
            let item_name = items.ref_path().map(ref_target_name).unwrap_or_else(|| name.to_string());
            config.items = Some(Box::new(build(items, &item_name, resolver, depth + 1)));
        }
    }
    config
}

fn annotate(schema: &Schema, default_name: &str) -> XmlConfig {
    let xml = schema.xml.clone().unwrap_or_default();
    let node_type = xml.node_type.clone();
    XmlConfig {
        name: xml.name.unwrap_or_else(|| default_name.to_string()),
        namespace: xml.namespace,
        prefix: xml.prefix,
        attribute: xml.attribute.unwrap_or(false) || node_type.as_deref() == Some("attribute"),
        wrapped: xml.wrapped.unwrap_or(false),
        node_type,
        properties: IndexMap::new(),
        items: None,
    }
}

/// Own properties plus those of inline or referenced `allOf` parts.
fn merged_properties(
    schema: &Schema,
    resolver: Option<&ReferenceResolver<'_>>,
) -> IndexMap<String, SchemaOrRef> {
    let mut merged = IndexMap::new();
    for part in &schema.all_of {
        if let Some(part) = inline_schema(part, resolver) {
            merged.extend(part.properties);
        }
    }
    merged.extend(schema.properties.clone());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> SchemaOrRef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_config_tree() {
        let book = schema(json!({
            "type": "object",
            "xml": {"name": "book", "namespace": "urn:books", "prefix": "bk"},
            "properties": {
                "id": {"type": "integer", "xml": {"attribute": true}},
                "authors": {
                    "type": "array",
                    "xml": {"wrapped": true},
                    "items": {"type": "string", "xml": {"name": "author"}}
                },
                "note": {"type": "string", "xml": {"nodeType": "cdata"}}
            }
        }));
        let config = xml_config(&book, &root_name(&book, None), None);
        assert_eq!(config.name, "book");
        assert_eq!(config.namespace.as_deref(), Some("urn:books"));
        assert_eq!(config.prefix.as_deref(), Some("bk"));
        assert!(config.properties["id"].attribute);
        let authors = &config.properties["authors"];
        assert!(authors.wrapped);
        assert_eq!(authors.items.as_ref().unwrap().name, "author");
        assert_eq!(config.properties["note"].node_type.as_deref(), Some("cdata"));
    }

    #[test]
    fn test_root_name_falls_back_to_ref_then_root() {
        assert_eq!(
            root_name(&schema(json!({"$ref": "#/components/schemas/Pet"})), None),
            "Pet"
        );
        assert_eq!(root_name(&schema(json!({"type": "object"})), None), "root");
    }
}
