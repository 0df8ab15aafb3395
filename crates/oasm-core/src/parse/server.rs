use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::Extensions;

/// A server variable for URL templates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Required by the grammar; optional here so a missing default is reported
    /// by validation rather than by the decoder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A server URL definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// OpenAPI 3.2 server name, unique within a `servers` array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Server {
    /// The URL with every `{variable}` replaced by its default.
    pub fn default_url(&self) -> String {
        let mut url = self.url.clone();
        for (name, var) in &self.variables {
            if let Some(default) = &var.default {
                url = url.replace(&format!("{{{name}}}"), default);
            }
        }
        url
    }
}

/// Names of the `{variable}` tokens of a server URL template, in order.
pub fn url_variables(url: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = url;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() {
                    out.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    out
}
