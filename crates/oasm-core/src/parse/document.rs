use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::components::Components;
use super::operation::PathItem;
use super::schema::SchemaOrRef;
use super::security::{SecurityRequirement, SecurityScheme, SecuritySchemeOrRef};
use super::server::Server;
use super::spec::{Info, OpenApiSpec};
use super::swagger::SwaggerSpec;

/// Which family of the grammar a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    OpenApi,
    Swagger,
}

impl SpecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecKind::OpenApi => "openapi",
            SpecKind::Swagger => "swagger",
        }
    }
}

/// The declared version of a document, e.g. `openapi 3.1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecVersion {
    #[serde(rename = "type")]
    pub kind: SpecKind,
    pub version: String,
}

impl SpecVersion {
    /// Major and minor version numbers, when parseable.
    pub fn major_minor(&self) -> Option<(u32, u32)> {
        let mut parts = self.version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
        Some((major, minor))
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.version)
    }
}

/// Read the version declaration of a raw document.
///
/// `openapi` wins over `swagger` when both are present; any other shape
/// yields `None`.
pub fn get_spec_version(raw: &serde_json::Value) -> Option<SpecVersion> {
    let obj = raw.as_object()?;
    if let Some(version) = obj.get("openapi").and_then(version_string) {
        return Some(SpecVersion {
            kind: SpecKind::OpenApi,
            version,
        });
    }
    obj.get("swagger").and_then(version_string).map(|version| SpecVersion {
        kind: SpecKind::Swagger,
        version,
    })
}

fn version_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        // YAML authors sometimes write `swagger: 2.0` unquoted.
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A decoded entry document in either dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiDocument {
    OpenApi(Box<OpenApiSpec>),
    Swagger(Box<SwaggerSpec>),
}

impl ApiDocument {
    /// Decode a raw document into the typed grammar of its dialect.
    pub fn from_value(raw: &serde_json::Value) -> Result<Self, String> {
        match get_spec_version(raw) {
            Some(SpecVersion {
                kind: SpecKind::Swagger,
                ..
            }) => {
                let mut raw = raw.clone();
                normalize_version_field(&mut raw, "swagger");
                serde_json::from_value::<SwaggerSpec>(raw)
                    .map(|spec| ApiDocument::Swagger(Box::new(spec)))
                    .map_err(|e| e.to_string())
            }
            Some(SpecVersion {
                kind: SpecKind::OpenApi,
                ..
            }) => {
                let mut raw = raw.clone();
                normalize_version_field(&mut raw, "openapi");
                serde_json::from_value::<OpenApiSpec>(raw)
                    .map(|spec| ApiDocument::OpenApi(Box::new(spec)))
                    .map_err(|e| e.to_string())
            }
            None => Err("document declares neither `openapi` nor `swagger`".to_string()),
        }
    }

    pub fn version(&self) -> SpecVersion {
        match self {
            ApiDocument::OpenApi(spec) => SpecVersion {
                kind: SpecKind::OpenApi,
                version: spec.openapi.clone(),
            },
            ApiDocument::Swagger(spec) => SpecVersion {
                kind: SpecKind::Swagger,
                version: spec.swagger.clone(),
            },
        }
    }

    pub fn info(&self) -> &Info {
        match self {
            ApiDocument::OpenApi(spec) => &spec.info,
            ApiDocument::Swagger(spec) => &spec.info,
        }
    }

    pub fn paths(&self) -> &IndexMap<String, PathItem> {
        match self {
            ApiDocument::OpenApi(spec) => &spec.paths,
            ApiDocument::Swagger(spec) => &spec.paths,
        }
    }

    pub fn webhooks(&self) -> Option<&IndexMap<String, PathItem>> {
        match self {
            ApiDocument::OpenApi(spec) => Some(&spec.webhooks),
            ApiDocument::Swagger(_) => None,
        }
    }

    pub fn components(&self) -> Option<&Components> {
        match self {
            ApiDocument::OpenApi(spec) => spec.components.as_ref(),
            ApiDocument::Swagger(_) => None,
        }
    }

    /// Named schemas from `components.schemas` or `definitions`.
    pub fn schema_definitions(&self) -> Option<&IndexMap<String, SchemaOrRef>> {
        match self {
            ApiDocument::OpenApi(spec) => spec.components.as_ref().map(|c| &c.schemas),
            ApiDocument::Swagger(spec) => Some(&spec.definitions),
        }
    }

    pub fn servers(&self) -> Vec<Server> {
        match self {
            ApiDocument::OpenApi(spec) => spec.servers.clone(),
            ApiDocument::Swagger(spec) => spec.servers(),
        }
    }

    pub fn security(&self) -> Option<&[SecurityRequirement]> {
        match self {
            ApiDocument::OpenApi(spec) => spec.security.as_deref(),
            ApiDocument::Swagger(spec) => spec.security.as_deref(),
        }
    }

    /// Security schemes, with Swagger 2.0 definitions converted. References
    /// are returned unresolved.
    pub fn security_schemes(&self) -> IndexMap<String, SecuritySchemeOrRef> {
        match self {
            ApiDocument::OpenApi(spec) => spec
                .components
                .as_ref()
                .map(|c| c.security_schemes.clone())
                .unwrap_or_default(),
            ApiDocument::Swagger(spec) => spec
                .security_definitions
                .iter()
                .map(|(name, def)| {
                    let scheme: SecurityScheme = def.to_security_scheme();
                    (name.clone(), SecuritySchemeOrRef::Scheme(Box::new(scheme)))
                })
                .collect(),
        }
    }

    /// Document-level default request media types (Swagger 2.0 only).
    pub fn consumes(&self) -> &[String] {
        match self {
            ApiDocument::OpenApi(_) => &[],
            ApiDocument::Swagger(spec) => &spec.consumes,
        }
    }

    /// Document-level default response media types (Swagger 2.0 only).
    pub fn produces(&self) -> &[String] {
        match self {
            ApiDocument::OpenApi(_) => &[],
            ApiDocument::Swagger(spec) => &spec.produces,
        }
    }

    pub fn self_uri(&self) -> Option<&str> {
        match self {
            ApiDocument::OpenApi(spec) => spec.self_uri.as_deref(),
            ApiDocument::Swagger(_) => None,
        }
    }
}

fn normalize_version_field(raw: &mut serde_json::Value, field: &str) {
    if let Some(obj) = raw.as_object_mut() {
        if let Some(serde_json::Value::Number(n)) = obj.get(field) {
            let text = n.to_string();
            obj.insert(field.to_string(), serde_json::Value::String(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_spec_version_openapi() {
        let v = get_spec_version(&json!({"openapi": "3.1.0"})).unwrap();
        assert_eq!(v.kind, SpecKind::OpenApi);
        assert_eq!(v.version, "3.1.0");
        assert_eq!(v.major_minor(), Some((3, 1)));
        assert_eq!(v.to_string(), "openapi 3.1.0");
    }

    #[test]
    fn test_get_spec_version_unquoted_swagger() {
        let v = get_spec_version(&json!({"swagger": 2.0})).unwrap();
        assert_eq!(v.kind, SpecKind::Swagger);
        assert_eq!(v.major_minor(), Some((2, 0)));
    }

    #[test]
    fn test_get_spec_version_none() {
        assert!(get_spec_version(&json!({"info": {}})).is_none());
        assert!(get_spec_version(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_from_value_swagger() {
        let doc = ApiDocument::from_value(&json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "securityDefinitions": {"key": {"type": "apiKey", "name": "k", "in": "header"}},
            "paths": {}
        }))
        .unwrap();
        assert!(matches!(doc, ApiDocument::Swagger(_)));
        assert_eq!(doc.security_schemes().len(), 1);
        assert!(doc.webhooks().is_none());
    }

    #[test]
    fn test_from_value_openapi_self() {
        let doc = ApiDocument::from_value(&json!({
            "openapi": "3.2.0",
            "$self": "https://example.com/api/openapi",
            "info": {"title": "t", "version": "1"},
            "paths": {}
        }))
        .unwrap();
        assert_eq!(doc.self_uri(), Some("https://example.com/api/openapi"));
        assert_eq!(doc.version().kind, SpecKind::OpenApi);
    }
}
