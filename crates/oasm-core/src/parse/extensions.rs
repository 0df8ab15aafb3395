use std::fmt;

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Specification extensions (`x-*` keys) attached to a node, kept verbatim.
///
/// Used with `#[serde(flatten)]`: every key of the surrounding object that the
/// node does not model is offered to this bag, and only `x-` keys are kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Extensions(IndexMap<String, serde_json::Value>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        if is_extension_key(&key) {
            self.0.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// Collect the `x-*` entries of a raw JSON object.
    pub fn from_object(obj: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self(
            obj.iter()
                .filter(|(k, _)| is_extension_key(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

pub fn is_extension_key(key: &str) -> bool {
    key.starts_with("x-")
}

/// Decode a map object that allows `x-*` keys beside its entries (Paths,
/// Responses, Callback). Extension keys are skipped before the entries are
/// decoded.
pub fn without_extensions<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .filter(|(key, _)| !is_extension_key(key))
        .map(|(key, value)| {
            let entry = serde_json::from_value(value).map_err(D::Error::custom)?;
            Ok((key, entry))
        })
        .collect()
}

impl<'de> Deserialize<'de> for Extensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExtensionsVisitor;

        impl<'de> Visitor<'de> for ExtensionsVisitor {
            type Value = Extensions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of specification extensions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Extensions, A::Error> {
                let mut out = IndexMap::new();
                while let Some(key) = map.next_key::<String>()? {
                    let value: serde_json::Value = map.next_value()?;
                    if is_extension_key(&key) {
                        out.insert(key, value);
                    }
                }
                Ok(Extensions(out))
            }
        }

        deserializer.deserialize_map(ExtensionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Node {
        name: String,
        #[serde(flatten)]
        extensions: Extensions,
    }

    #[test]
    fn test_flatten_keeps_only_x_keys() {
        let node: Node = serde_json::from_value(json!({
            "name": "a",
            "x-internal": true,
            "x-codegen": {"skip": 1},
            "unknown": 3
        }))
        .unwrap();
        assert_eq!(node.name, "a");
        assert_eq!(node.extensions.len(), 2);
        assert_eq!(node.extensions.get("x-internal"), Some(&json!(true)));
        assert_eq!(node.extensions.get("x-codegen"), Some(&json!({"skip": 1})));
        assert!(node.extensions.get("unknown").is_none());
    }

    #[derive(Debug, Deserialize)]
    struct Entries {
        #[serde(default, deserialize_with = "without_extensions")]
        entries: IndexMap<String, Node>,
    }

    #[test]
    fn test_map_entries_skip_extension_keys() {
        let decoded: Entries = serde_json::from_value(json!({
            "entries": {
                "x-flag": true,
                "x-list": [1, 2],
                "first": {"name": "one"}
            }
        }))
        .unwrap();
        assert_eq!(decoded.entries.keys().collect::<Vec<_>>(), vec!["first"]);

        let missing: Entries = serde_json::from_value(json!({})).unwrap();
        assert!(missing.entries.is_empty());

        let bad = serde_json::from_value::<Entries>(json!({"entries": {"first": 3}}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_insert_ignores_non_extension_keys() {
        let mut ext = Extensions::new();
        ext.insert("summary", json!("nope"));
        ext.insert("x-rate-limit", json!(10));
        assert_eq!(ext.len(), 1);
    }
}
