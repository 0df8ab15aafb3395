use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::{Extensions, without_extensions};
use super::link::CallbackOrRef;
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::security::SecurityRequirement;
use super::server::Server;
use crate::ir::HttpMethod;

/// An API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyOrRef>,

    #[serde(
        default,
        deserialize_with = "without_extensions",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// Swagger 2.0 request media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    /// Swagger 2.0 response media types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Operation>,

    /// OpenAPI 3.2 operations for verbs without a dedicated field.
    #[serde(
        rename = "additionalOperations",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub additional_operations: IndexMap<String, Operation>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl PathItem {
    /// Declared operations in document order of the fixed fields, followed by
    /// `additionalOperations`.
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        let fixed = [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
            (HttpMethod::Query, &self.query),
        ];
        let mut out: Vec<(HttpMethod, &Operation)> = fixed
            .into_iter()
            .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
            .collect();
        for (verb, op) in &self.additional_operations {
            out.push((HttpMethod::parse(verb), op));
        }
        out
    }

    /// Overlay the fields of a referencing path item onto the referenced one.
    /// Local `summary`/`description` win; local operations and parameters are
    /// added when the target lacks them.
    pub fn merged_over(&self, target: PathItem) -> PathItem {
        let mut merged = target;
        merged.ref_path = None;
        if self.summary.is_some() {
            merged.summary = self.summary.clone();
        }
        if self.description.is_some() {
            merged.description = self.description.clone();
        }
        if !self.parameters.is_empty() {
            merged.parameters.extend(self.parameters.iter().cloned());
        }
        if !self.servers.is_empty() {
            merged.servers = self.servers.clone();
        }
        macro_rules! fill_op {
            ($field:ident) => {
                if merged.$field.is_none() {
                    merged.$field = self.$field.clone();
                }
            };
        }
        fill_op!(get);
        fill_op!(put);
        fill_op!(post);
        fill_op!(delete);
        fill_op!(options);
        fill_op!(head);
        fill_op!(patch);
        fill_op!(trace);
        fill_op!(query);
        for (verb, op) in &self.additional_operations {
            merged
                .additional_operations
                .entry(verb.clone())
                .or_insert_with(|| op.clone());
        }
        for (key, value) in self.extensions.iter() {
            merged.extensions.insert(key.clone(), value.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operations_include_query_and_additional() {
        let item: PathItem = serde_json::from_value(json!({
            "get": {"operationId": "a"},
            "query": {"operationId": "b"},
            "additionalOperations": {"LINK": {"operationId": "c"}}
        }))
        .unwrap();
        let methods: Vec<String> = item
            .operations()
            .iter()
            .map(|(m, _)| m.as_str().to_string())
            .collect();
        assert_eq!(methods, vec!["GET", "QUERY", "LINK"]);
    }

    #[test]
    fn test_merged_over_prefers_local_summary() {
        let local: PathItem = serde_json::from_value(json!({
            "$ref": "#/components/pathItems/Pets",
            "summary": "local"
        }))
        .unwrap();
        let target: PathItem = serde_json::from_value(json!({
            "summary": "remote",
            "description": "kept",
            "get": {}
        }))
        .unwrap();
        let merged = local.merged_over(target);
        assert_eq!(merged.summary.as_deref(), Some("local"));
        assert_eq!(merged.description.as_deref(), Some("kept"));
        assert!(merged.get.is_some());
        assert!(merged.ref_path.is_none());
    }
}
