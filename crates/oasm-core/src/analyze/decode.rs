use std::collections::HashSet;

use serde::Serialize;

use crate::parse::schema::{Schema, SchemaOrRef};
use crate::resolve::{ReferenceResolver, inline_schema};

/// A location inside a payload schema whose string value carries encoded
/// content (`contentEncoding`/`contentSchema`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeHint {
    /// JSON Pointer into the payload, empty for the payload itself; `*` stands
    /// for any array item or map value.
    pub pointer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
}

/// Find encoded-content keywords anywhere in a schema, down to `max_depth`
/// nested schemas. A reference already being expanded on the current path is
/// not entered again.
pub fn decode_hints(
    schema: &SchemaOrRef,
    resolver: Option<&ReferenceResolver<'_>>,
    max_depth: usize,
) -> Vec<DecodeHint> {
    let mut walker = Walker {
        resolver,
        max_depth,
        on_path: HashSet::new(),
        hints: Vec::new(),
    };
    walker.visit(schema, String::new(), 0);
    walker.hints
}

/// Whether a consumer should wrap the payload in a decode step.
pub fn needs_auto_decode(
    schema: &SchemaOrRef,
    resolver: Option<&ReferenceResolver<'_>>,
    max_depth: usize,
) -> bool {
    !decode_hints(schema, resolver, max_depth).is_empty()
}

struct Walker<'r, 'a> {
    resolver: Option<&'r ReferenceResolver<'a>>,
    max_depth: usize,
    on_path: HashSet<String>,
    hints: Vec<DecodeHint>,
}

impl Walker<'_, '_> {
    fn visit(&mut self, schema: &SchemaOrRef, pointer: String, depth: usize) {
        if depth > self.max_depth {
            return;
        }
        let entered = schema.ref_path().map(str::to_string);
        if let Some(ref_path) = &entered {
            if !self.on_path.insert(ref_path.clone()) {
                return;
            }
        }
        if let Some(resolved) = inline_schema(schema, self.resolver) {
            self.visit_schema(&resolved, pointer, depth);
        }
        if let Some(ref_path) = &entered {
            self.on_path.remove(ref_path);
        }
    }

    fn visit_schema(&mut self, schema: &Schema, pointer: String, depth: usize) {
        if schema.content_encoding.is_some() || schema.content_schema.is_some() {
            self.hints.push(DecodeHint {
                pointer: pointer.clone(),
                content_encoding: schema.content_encoding.clone(),
                content_media_type: schema.content_media_type.clone(),
            });
        }
        let next = depth + 1;
        for (name, prop) in &schema.properties {
            self.visit(prop, format!("{pointer}/{name}"), next);
        }
        if let Some(items) = &schema.items {
            self.visit(items, format!("{pointer}/*"), next);
        }
        for (i, item) in schema.prefix_items.iter().enumerate() {
            self.visit(item, format!("{pointer}/{i}"), next);
        }
        if let Some(extra) = &schema.additional_properties {
            self.visit(extra, format!("{pointer}/*"), next);
        }
        for part in schema
            .all_of
            .iter()
            .chain(&schema.one_of)
            .chain(&schema.any_of)
        {
            self.visit(part, pointer.clone(), next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_AUTO_DECODE_DEPTH;
    use crate::diagnostics::Diagnostics;
    use crate::resolve::DocumentCache;
    use serde_json::json;
    use url::Url;

    fn with_components<R>(
        schemas: serde_json::Value,
        f: impl FnOnce(&ReferenceResolver<'_>) -> R,
    ) -> R {
        let uri = Url::parse("https://example.com/openapi.json").unwrap();
        let mut cache = DocumentCache::new();
        cache.insert(uri.as_str(), json!({"components": {"schemas": schemas}}));
        let diagnostics = Diagnostics::new();
        let resolver = ReferenceResolver::new(&cache, uri, &diagnostics);
        f(&resolver)
    }

    fn schema(value: serde_json::Value) -> SchemaOrRef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_top_level_encoding() {
        let s = schema(json!({"type": "string", "contentEncoding": "base64"}));
        let hints = decode_hints(&s, None, DEFAULT_AUTO_DECODE_DEPTH);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].pointer, "");
        assert_eq!(hints[0].content_encoding.as_deref(), Some("base64"));
    }

    #[test]
    fn test_nested_content_schema() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "events": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "payload": {
                                "type": "string",
                                "contentMediaType": "application/json",
                                "contentSchema": {"type": "object"}
                            }
                        }
                    }
                }
            }
        }));
        let hints = decode_hints(&s, None, DEFAULT_AUTO_DECODE_DEPTH);
        assert_eq!(hints[0].pointer, "/events/*/payload");
        assert_eq!(hints[0].content_media_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_depth_bound() {
        let s = schema(json!({
            "properties": {"a": {"properties": {"b": {"contentEncoding": "base64"}}}}
        }));
        assert!(needs_auto_decode(&s, None, 2));
        assert!(!needs_auto_decode(&s, None, 1));
    }

    #[test]
    fn test_plain_schema_needs_no_decode() {
        let s = schema(json!({"type": "object", "properties": {"id": {"type": "integer"}}}));
        assert!(!needs_auto_decode(&s, None, DEFAULT_AUTO_DECODE_DEPTH));
    }

    #[test]
    fn test_shared_reference_hints_every_use() {
        let s = schema(json!({
            "type": "object",
            "properties": {
                "avatar": {"$ref": "#/components/schemas/Blob"},
                "banner": {"$ref": "#/components/schemas/Blob"}
            }
        }));
        let pointers: Vec<String> = with_components(
            json!({"Blob": {"type": "string", "contentEncoding": "base64"}}),
            |r| decode_hints(&s, Some(r), DEFAULT_AUTO_DECODE_DEPTH),
        )
        .into_iter()
        .map(|h| h.pointer)
        .collect();
        assert_eq!(pointers, vec!["/avatar", "/banner"]);
    }

    #[test]
    fn test_recursive_reference_terminates() {
        let s = schema(json!({"$ref": "#/components/schemas/Node"}));
        let hints = with_components(
            json!({"Node": {
                "type": "object",
                "properties": {
                    "data": {"type": "string", "contentEncoding": "base64"},
                    "next": {"$ref": "#/components/schemas/Node"}
                }
            }}),
            |r| decode_hints(&s, Some(r), DEFAULT_AUTO_DECODE_DEPTH),
        );
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].pointer, "/data");
    }
}
