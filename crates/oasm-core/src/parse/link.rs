use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::{Extensions, without_extensions};
use super::operation::PathItem;
use super::server::Server;

/// A design-time link from a response to another operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "operationRef", skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,

    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, serde_json::Value>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A reference or inline link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Link(Link),
}

/// A callback: runtime expression → path item.
pub type Callback = IndexMap<String, PathItem>;

/// A reference or inline callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallbackOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Callback(#[serde(deserialize_with = "without_extensions")] Callback),
}
