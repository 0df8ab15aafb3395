use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::{Extensions, without_extensions};
use super::operation::PathItem;
use super::parameter::Parameter;
use super::response::Response;
use super::schema::SchemaOrRef;
use super::security::{SecurityRequirement, SwaggerSecurityScheme};
use super::server::Server;
use super::spec::{Info, Tag};

/// Top-level Swagger 2.0 specification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwaggerSpec {
    pub swagger: String,

    #[serde(default)]
    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(
        default,
        deserialize_with = "without_extensions",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,

    #[serde(
        rename = "securityDefinitions",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_definitions: IndexMap<String, SwaggerSecurityScheme>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl SwaggerSpec {
    /// Server list synthesized from `schemes`, `host` and `basePath`.
    ///
    /// Without a `host` the API is served relative to the document, so a
    /// single relative server carrying only the base path is returned.
    pub fn servers(&self) -> Vec<Server> {
        let base_path = self.base_path.clone().unwrap_or_default();
        let Some(host) = &self.host else {
            return if base_path.is_empty() {
                Vec::new()
            } else {
                vec![Server {
                    url: base_path,
                    ..Server::default()
                }]
            };
        };
        let schemes: Vec<&str> = if self.schemes.is_empty() {
            vec!["https"]
        } else {
            self.schemes.iter().map(String::as_str).collect()
        };
        schemes
            .into_iter()
            .map(|scheme| Server {
                url: format!("{scheme}://{host}{base_path}"),
                ..Server::default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_servers_from_host() {
        let spec: SwaggerSpec = serde_json::from_value(json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "host": "api.example.com",
            "basePath": "/v1",
            "schemes": ["http", "https"],
            "paths": {}
        }))
        .unwrap();
        let urls: Vec<String> = spec.servers().into_iter().map(|s| s.url).collect();
        assert_eq!(
            urls,
            vec!["http://api.example.com/v1", "https://api.example.com/v1"]
        );
    }

    #[test]
    fn test_servers_without_host() {
        let spec: SwaggerSpec =
            serde_json::from_value(json!({"swagger": "2.0", "paths": {}})).unwrap();
        assert!(spec.servers().is_empty());
    }
}
