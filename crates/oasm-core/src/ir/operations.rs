use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::parse::extensions::Extensions;
use crate::parse::link::Link;
use crate::parse::parameter::Parameter;
use crate::parse::request_body::RequestBody;
use crate::parse::response::Response;
use crate::parse::security::SecurityRequirement;
use crate::parse::server::Server;

/// HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
    /// OpenAPI 3.2 `QUERY`.
    Query,
    /// A verb declared through `additionalOperations`.
    Other(String),
}

impl HttpMethod {
    /// Parse a verb case-insensitively.
    pub fn parse(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            "TRACE" => HttpMethod::Trace,
            "QUERY" => HttpMethod::Query,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Query => "QUERY",
            HttpMethod::Other(verb) => verb,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// One HTTP operation, fully denormalized.
///
/// Parameters, request body and responses are resolved: none of them is a
/// reference. Swagger 2.0 `body` parameters appear as `request_body` and
/// `formData` parameters as `form_fields`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathInfo {
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub form_fields: Vec<Parameter>,
    /// Effective Swagger 2.0 request media types; empty for OpenAPI 3.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: IndexMap<String, Response>,
    /// The operation's own requirements, keys normalized to scheme names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Operation servers, else path-item servers; empty means the document's.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub callbacks: Vec<CallbackInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkInfo>,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    /// Filled in by grouping from the naming strategy.
    #[serde(rename = "methodName", skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
}

impl PathInfo {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            operation_id: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            parameters: Vec::new(),
            form_fields: Vec::new(),
            consumes: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
            security: None,
            servers: Vec::new(),
            callbacks: Vec::new(),
            links: Vec::new(),
            deprecated: false,
            extensions: Extensions::new(),
            method_name: None,
        }
    }

    /// `operationId`, or `METHOD path` when absent.
    pub fn display_name(&self) -> String {
        match &self.operation_id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// One named callback of an operation, for one runtime expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackInfo {
    pub name: String,
    pub expression: String,
    pub operations: Vec<PathInfo>,
}

/// A response link, located by its source operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkInfo {
    pub name: String,
    pub source: String,
    pub status: String,
    pub link: Link,
}
