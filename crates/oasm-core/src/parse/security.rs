use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::extensions::Extensions;

/// A security scheme type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

/// Location of an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// OAuth2 flows configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
    #[serde(
        rename = "deviceAuthorization",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_authorization: Option<OAuthFlow>,
}

/// A single OAuth2 flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OAuthFlow {
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(
        rename = "deviceAuthorizationUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(rename = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

/// A security scheme definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,

    #[serde(
        rename = "oauth2MetadataUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub oauth2_metadata_url: Option<String>,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A reference or inline security scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecuritySchemeOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Scheme(Box<SecurityScheme>),
}

/// A security requirement: map of scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Swagger 2.0 security scheme types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwaggerSecurityType {
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "oauth2")]
    OAuth2,
}

/// A Swagger 2.0 `securityDefinitions` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerSecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SwaggerSecurityType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    /// `implicit`, `password`, `application` or `accessCode`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default)]
    pub scopes: IndexMap<String, String>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl SwaggerSecurityScheme {
    /// The OpenAPI 3 equivalent of this definition.
    pub fn to_security_scheme(&self) -> SecurityScheme {
        let mut scheme = SecurityScheme {
            scheme_type: SecuritySchemeType::ApiKey,
            description: self.description.clone(),
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
            oauth2_metadata_url: None,
            deprecated: false,
            extensions: self.extensions.clone(),
        };
        match self.scheme_type {
            SwaggerSecurityType::Basic => {
                scheme.scheme_type = SecuritySchemeType::Http;
                scheme.scheme = Some("basic".to_string());
            }
            SwaggerSecurityType::ApiKey => {
                scheme.name = self.name.clone();
                scheme.location = self.location.clone();
            }
            SwaggerSecurityType::OAuth2 => {
                scheme.scheme_type = SecuritySchemeType::OAuth2;
                let flow = OAuthFlow {
                    authorization_url: self.authorization_url.clone(),
                    device_authorization_url: None,
                    token_url: self.token_url.clone(),
                    refresh_url: None,
                    scopes: self.scopes.clone(),
                };
                let mut flows = OAuthFlows::default();
                match self.flow.as_deref() {
                    Some("implicit") => flows.implicit = Some(flow),
                    Some("password") => flows.password = Some(flow),
                    Some("application") => flows.client_credentials = Some(flow),
                    Some("accessCode") => flows.authorization_code = Some(flow),
                    _ => {}
                }
                scheme.flows = Some(flows);
            }
        }
        scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scheme_type_names() {
        let s: SecurityScheme = serde_json::from_value(json!({
            "type": "oauth2",
            "flows": {"clientCredentials": {"tokenUrl": "https://x/token", "scopes": {}}}
        }))
        .unwrap();
        assert_eq!(s.scheme_type, SecuritySchemeType::OAuth2);
        let m: SecurityScheme = serde_json::from_value(json!({"type": "mutualTLS"})).unwrap();
        assert_eq!(m.scheme_type, SecuritySchemeType::MutualTls);
    }

    #[test]
    fn test_swagger_access_code_flow() {
        let s: SwaggerSecurityScheme = serde_json::from_value(json!({
            "type": "oauth2",
            "flow": "accessCode",
            "authorizationUrl": "https://x/auth",
            "tokenUrl": "https://x/token",
            "scopes": {"read": "read things"}
        }))
        .unwrap();
        let converted = s.to_security_scheme();
        let flows = converted.flows.unwrap();
        let code = flows.authorization_code.unwrap();
        assert_eq!(code.token_url.as_deref(), Some("https://x/token"));
        assert_eq!(code.scopes.len(), 1);
    }

    #[test]
    fn test_swagger_basic_becomes_http() {
        let s: SwaggerSecurityScheme = serde_json::from_value(json!({"type": "basic"})).unwrap();
        let converted = s.to_security_scheme();
        assert_eq!(converted.scheme_type, SecuritySchemeType::Http);
        assert_eq!(converted.scheme.as_deref(), Some("basic"));
    }
}
