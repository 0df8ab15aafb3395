use std::collections::HashMap;

use indexmap::IndexMap;
use url::Url;

/// Canonical cache key of a document location: the absolute URI without its
/// fragment.
pub fn canonical_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Parsed documents of one run, keyed by canonical URI.
///
/// Besides whole documents the cache holds schema sub-fragments indexed by
/// `$id` (`baseUri`) and `$anchor`/`$dynamicAnchor` (`baseUri#anchor`).
#[derive(Debug, Default, Clone)]
pub struct DocumentCache {
    documents: IndexMap<String, serde_json::Value>,
    aliases: HashMap<String, String>,
    dynamic_anchors: IndexMap<String, String>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document. An existing entry under the same key is kept, so
    /// the first load of a URI wins.
    pub fn insert(&mut self, key: impl Into<String>, document: serde_json::Value) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.documents.insert(key, document);
        true
    }

    /// Make `alias` resolve to the entry stored under `target`.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        let alias = alias.into();
        let target = target.into();
        if alias != target && !self.documents.contains_key(&alias) {
            self.aliases.insert(alias, target);
        }
    }

    /// Record a `$dynamicAnchor` name and the cache key of its schema. The
    /// outermost (first indexed) anchor of a name wins.
    pub fn register_dynamic_anchor(&mut self, name: impl Into<String>, key: impl Into<String>) {
        self.dynamic_anchors.entry(name.into()).or_insert(key.into());
    }

    /// The cache key (`baseUri#anchor`) and schema of a dynamic anchor.
    pub fn dynamic_anchor(&self, name: &str) -> Option<(&str, &serde_json::Value)> {
        let key = self.dynamic_anchors.get(name)?;
        self.get(key).map(|schema| (key.as_str(), schema))
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.documents.get(self.target_key(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.documents.contains_key(self.target_key(key))
    }

    /// The key an alias points at, or the key itself.
    pub fn target_key<'k>(&'k self, key: &'k str) -> &'k str {
        self.aliases.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.documents.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_insert_wins() {
        let mut cache = DocumentCache::new();
        assert!(cache.insert("https://x/a.json", json!({"v": 1})));
        assert!(!cache.insert("https://x/a.json", json!({"v": 2})));
        assert_eq!(cache.get("https://x/a.json"), Some(&json!({"v": 1})));
    }

    #[test]
    fn test_alias_resolves_same_entry() {
        let mut cache = DocumentCache::new();
        cache.insert("file:///tmp/openapi.yaml", json!({"openapi": "3.2.0"}));
        cache.alias("https://example.com/api", "file:///tmp/openapi.yaml");
        assert_eq!(
            cache.get("https://example.com/api"),
            cache.get("file:///tmp/openapi.yaml")
        );
        assert!(cache.contains("https://example.com/api"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_canonical_key_strips_fragment() {
        let url = Url::parse("https://Example.com/a.yaml#/components").unwrap();
        assert_eq!(canonical_key(&url), "https://example.com/a.yaml");
    }
}
