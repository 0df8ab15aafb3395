use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::cache::{DocumentCache, canonical_key};
use super::pointer::{encode_pointer_segment, pointer_tokens, walk};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parse::schema::{Schema, SchemaOrRef};

/// Sibling keys a reference object may use to override the target's metadata.
const OVERRIDE_KEYS: [&str; 2] = ["summary", "description"];

/// Follows `$ref`/`$dynamicRef` strings against a [`DocumentCache`].
///
/// The resolver never fetches: documents missing from the cache are reported
/// as diagnostics and resolve to `None`. Every failure is soft.
pub struct ReferenceResolver<'a> {
    cache: &'a DocumentCache,
    root_uri: Url,
    diagnostics: &'a Diagnostics,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(cache: &'a DocumentCache, root_uri: Url, diagnostics: &'a Diagnostics) -> Self {
        Self {
            cache,
            root_uri,
            diagnostics,
        }
    }

    pub fn root_uri(&self) -> &Url {
        &self.root_uri
    }

    pub fn cache(&self) -> &DocumentCache {
        self.cache
    }

    pub fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    /// A reference made absolute against the root document.
    pub fn absolute_uri(&self, reference: &str) -> Option<Url> {
        self.root_uri.join(reference.trim()).ok()
    }

    /// The root document of the run.
    pub fn root_document(&self) -> Option<&serde_json::Value> {
        self.cache.get(&canonical_key(&self.root_uri))
    }

    /// Resolve a reference string relative to the root document.
    ///
    /// The result is never itself a reference object: chains are followed to
    /// their end.
    pub fn resolve_reference(&self, reference: &str) -> Option<serde_json::Value> {
        let mut visited = HashSet::new();
        let (value, base) = self.lookup(reference, &self.root_uri)?;
        self.follow(value, &base, &mut visited)
    }

    /// Pass non-reference values through unchanged; follow references.
    ///
    /// Sibling `summary`/`description` on a reference object override the
    /// resolved target's own.
    pub fn resolve(&self, value: &serde_json::Value) -> Option<serde_json::Value> {
        let mut visited = HashSet::new();
        self.follow(value.clone(), &self.root_uri, &mut visited)
    }

    /// Resolve a value and decode it into a typed node.
    pub fn resolve_as<T: DeserializeOwned>(&self, value: &serde_json::Value) -> Option<T> {
        let resolved = self.resolve(value)?;
        self.decode(resolved)
    }

    /// Resolve a reference string and decode the target into a typed node.
    pub fn resolve_ref_as<T: DeserializeOwned>(&self, reference: &str) -> Option<T> {
        let resolved = self.resolve_reference(reference)?;
        self.decode(resolved)
    }

    /// Resolve a typed `*OrRef` node into its inline form.
    pub fn resolve_node<N: Serialize, T: DeserializeOwned>(&self, node: &N) -> Option<T> {
        match serde_json::to_value(node) {
            Ok(value) => self.resolve_as(&value),
            Err(e) => {
                self.diagnostics.warn(
                    DiagnosticKind::UnsupportedConstruct,
                    format!("Failed to serialize node for resolution: {e}"),
                );
                None
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, value: serde_json::Value) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(node) => Some(node),
            Err(e) => {
                self.diagnostics.warn(
                    DiagnosticKind::UnsupportedConstruct,
                    format!(
                        "Resolved value is not a valid {}: {e}",
                        short_type_name::<T>()
                    ),
                );
                None
            }
        }
    }

    fn follow(
        &self,
        value: serde_json::Value,
        base: &Url,
        visited: &mut HashSet<String>,
    ) -> Option<serde_json::Value> {
        let parsed = value
            .as_object()
            .map(|obj| (reference_of(obj), overrides_of(obj)));
        let (reference, overrides) = match parsed {
            None | Some((Ok(None), _)) => return Some(value),
            Some((Err(message), _)) => {
                self.diagnostics
                    .warn(DiagnosticKind::UnresolvedReference, message);
                return None;
            }
            Some((Ok(Some(reference)), overrides)) => (reference, overrides),
        };

        let absolute = match base.join(reference.as_str()) {
            Ok(url) => url.to_string(),
            Err(_) => reference.as_str().to_string(),
        };
        if !visited.insert(absolute.clone()) {
            self.diagnostics.warn(
                DiagnosticKind::UnresolvedReference,
                format!("Circular reference chain through \"{absolute}\""),
            );
            return None;
        }

        let (target, target_base) = match &reference {
            Reference::Static(r) => self.lookup(r, base)?,
            Reference::Dynamic(r) => self.lookup_dynamic(r, base)?,
        };
        let mut resolved = self.follow(target, &target_base, visited)?;
        if let Some(resolved_obj) = resolved.as_object_mut() {
            for (key, v) in overrides {
                resolved_obj.insert(key, v);
            }
        }
        Some(resolved)
    }

    /// Locate the raw target of one reference and the base URI its own
    /// references are relative to.
    fn lookup(&self, reference: &str, base: &Url) -> Option<(serde_json::Value, Url)> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            self.diagnostics.warn(
                DiagnosticKind::UnresolvedReference,
                "Invalid reference: empty string",
            );
            return None;
        }
        let url = match base.join(trimmed) {
            Ok(url) => url,
            Err(e) => {
                self.diagnostics.warn(
                    DiagnosticKind::UnresolvedReference,
                    format!("Invalid reference \"{reference}\": {e}"),
                );
                return None;
            }
        };
        let doc_key = canonical_key(&url);
        let fragment = url.fragment().unwrap_or("");

        // `$id`/`$anchor` entries are addressed by their full key.
        if !fragment.is_empty() && !fragment.starts_with('/') {
            let anchor_key = format!("{doc_key}#{fragment}");
            return match self.cache.get(&anchor_key) {
                Some(found) => Some(self.rebased(found, &url)),
                None => {
                    self.diagnostics.warn(
                        DiagnosticKind::UnresolvedReference,
                        format!("Failed to resolve anchor \"{fragment}\" of \"{reference}\""),
                    );
                    None
                }
            };
        }

        let Some(document) = self.cache.get(&doc_key) else {
            self.diagnostics.warn(
                DiagnosticKind::UnresolvedReference,
                format!("Unresolved external file reference \"{reference}\" ({doc_key} is not loaded)"),
            );
            return None;
        };
        let tokens = pointer_tokens(fragment);
        match walk(document, &tokens) {
            Ok(found) => {
                let mut doc_url = url.clone();
                doc_url.set_fragment(None);
                Some(self.rebased(found, &doc_url))
            }
            Err(part) => {
                self.diagnostics.warn(
                    DiagnosticKind::UnresolvedReference,
                    format!("Failed to resolve reference part \"{part}\" of \"{reference}\""),
                );
                None
            }
        }
    }

    /// `$dynamicRef` goes through the dynamic anchor index first, then
    /// resolves like `$ref`. An indexed anchor's own references are relative
    /// to the document that declares it.
    fn lookup_dynamic(&self, reference: &str, base: &Url) -> Option<(serde_json::Value, Url)> {
        if let Some((_, anchor)) = reference.rsplit_once('#') {
            if !anchor.is_empty() && !anchor.starts_with('/') {
                let indexed = self
                    .cache
                    .dynamic_anchor(anchor)
                    .and_then(|(key, found)| Url::parse(key).ok().map(|url| (url, found)));
                if let Some((mut anchor_url, found)) = indexed {
                    anchor_url.set_fragment(None);
                    return Some(self.rebased(found, &anchor_url));
                }
            }
        }
        self.lookup(reference, base)
    }

    /// Values found outside the root document get their relative references
    /// rewritten to absolute URIs so they stay resolvable after decoding.
    fn rebased(&self, value: &serde_json::Value, source: &Url) -> (serde_json::Value, Url) {
        let mut value = value.clone();
        let source_key = self.cache.target_key(&canonical_key(source)).to_string();
        let root_key = self
            .cache
            .target_key(&canonical_key(&self.root_uri))
            .to_string();
        if source_key != root_key {
            rebase_refs(&mut value, source);
        }
        (value, source.clone())
    }
}

fn reference_of(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<Option<Reference>, String> {
    match (obj.get("$ref"), obj.get("$dynamicRef")) {
        (Some(serde_json::Value::String(r)), _) => Ok(Some(Reference::Static(r.clone()))),
        (Some(other), _) => Err(format!(
            "Invalid reference value {other}: expected a string"
        )),
        (None, Some(serde_json::Value::String(r))) => Ok(Some(Reference::Dynamic(r.clone()))),
        _ => Ok(None),
    }
}

fn overrides_of(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Vec<(String, serde_json::Value)> {
    OVERRIDE_KEYS
        .iter()
        .filter_map(|key| obj.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

enum Reference {
    Static(String),
    Dynamic(String),
}

impl Reference {
    fn as_str(&self) -> &str {
        match self {
            Reference::Static(r) | Reference::Dynamic(r) => r,
        }
    }
}

/// Inline form of a schema node. Boolean schemas and references that do not
/// resolve (or that have no resolver to resolve them) yield `None`.
pub fn inline_schema(schema: &SchemaOrRef, resolver: Option<&ReferenceResolver<'_>>) -> Option<Schema> {
    match schema {
        SchemaOrRef::Schema(s) => Some((**s).clone()),
        SchemaOrRef::Ref { .. } => resolver?.resolve_node(schema),
        SchemaOrRef::Boolean(_) => None,
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Rewrite every `$ref`/`$dynamicRef` in `value` to an absolute URI against
/// `base`, tracking nested `$id` scopes.
pub fn rebase_refs(value: &mut serde_json::Value, base: &Url) {
    match value {
        serde_json::Value::Object(map) => {
            let scoped = map
                .get("$id")
                .and_then(|id| id.as_str())
                .and_then(|id| base.join(id).ok());
            let base = scoped.as_ref().unwrap_or(base);
            for key in ["$ref", "$dynamicRef"] {
                let absolute = map
                    .get(key)
                    .and_then(|v| v.as_str())
                    .and_then(|r| base.join(r).ok());
                if let Some(absolute) = absolute {
                    map.insert(
                        key.to_string(),
                        serde_json::Value::String(absolute.to_string()),
                    );
                }
            }
            for (key, child) in map.iter_mut() {
                if key != "$ref" && key != "$dynamicRef" {
                    rebase_refs(child, base);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                rebase_refs(item, base);
            }
        }
        _ => {}
    }
}

/// Every `$ref`/`$dynamicRef` string reachable from `value`, in document
/// order.
pub fn find_refs(value: &serde_json::Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_refs(value, &mut out);
    out
}

fn collect_refs(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref" | "$dynamicRef", serde_json::Value::String(r)) => out.push(r.clone()),
                    _ => collect_refs(child, out),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        _ => {}
    }
}

/// JSON Pointers of every `$ref` whose value is not a string, with that value.
pub fn invalid_refs(value: &serde_json::Value) -> Vec<(String, serde_json::Value)> {
    let mut out = Vec::new();
    collect_invalid_refs(value, String::new(), &mut out);
    out
}

fn collect_invalid_refs(
    value: &serde_json::Value,
    pointer: String,
    out: &mut Vec<(String, serde_json::Value)>,
) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let child_pointer = format!("{pointer}/{}", encode_pointer_segment(key));
                if key == "$ref" && !child.is_string() {
                    out.push((child_pointer, child.clone()));
                } else {
                    collect_invalid_refs(child, child_pointer, out);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_invalid_refs(item, format!("{pointer}/{i}"), out);
            }
        }
        _ => {}
    }
}

/// Index every `$id`, `$anchor` and `$dynamicAnchor` of `spec` into `cache`
/// under `baseUri` and `baseUri#anchor` keys. Identifiers that do not form a
/// valid URI against their scope are skipped.
pub fn index_schema_ids(spec: &serde_json::Value, doc_uri: &Url, cache: &mut DocumentCache) {
    index_node(spec, doc_uri, cache);
}

fn index_node(value: &serde_json::Value, base: &Url, cache: &mut DocumentCache) {
    match value {
        serde_json::Value::Object(map) => {
            let mut scope = base.clone();
            if let Some(id) = map.get("$id").and_then(|v| v.as_str()) {
                match base.join(id) {
                    Ok(url) => {
                        let key = canonical_key(&url);
                        if cache.insert(key.clone(), value.clone()) {
                            log::debug!("indexed $id {key}");
                        }
                        scope = url;
                        scope.set_fragment(None);
                    }
                    Err(e) => log::debug!("ignoring invalid $id {id:?}: {e}"),
                }
            }
            let scope_key = canonical_key(&scope);
            if let Some(anchor) = map.get("$anchor").and_then(|v| v.as_str()) {
                cache.insert(format!("{scope_key}#{anchor}"), value.clone());
            }
            if let Some(anchor) = map.get("$dynamicAnchor").and_then(|v| v.as_str()) {
                let key = format!("{scope_key}#{anchor}");
                cache.insert(key.clone(), value.clone());
                cache.register_dynamic_anchor(anchor, key);
            }
            for child in map.values() {
                index_node(child, &scope, cache);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                index_node(item, base, cache);
            }
        }
        _ => {}
    }
}
