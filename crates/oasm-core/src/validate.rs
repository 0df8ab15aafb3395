use std::collections::HashSet;

use serde_json::{Map, Value};
use url::Url;

use crate::error::ValidationError;
use crate::parse::document::{SpecKind, get_spec_version};
use crate::parse::extensions::is_extension_key;
use crate::parse::server::url_variables;

const OPERATION_KEYS: [&str; 9] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace", "query",
];

/// Check the structural rules of a raw, unresolved document.
///
/// Servers are checked before security schemes, which are checked before the
/// presence of `info`/`paths`; the first violation is returned.
pub fn validate_spec(raw: &Value) -> Result<(), ValidationError> {
    let root = raw.as_object().ok_or(ValidationError::NotAnObject)?;
    let version = check_version(raw, root)?;

    if let Some(servers) = root.get("servers") {
        validate_servers(servers, "servers")?;
    }
    if let Some(Value::Object(paths)) = root.get("paths") {
        for (path, item) in paths.iter().filter(|(k, _)| !is_extension_key(k)) {
            validate_path_item_servers(path, item)?;
        }
    }

    match version {
        SpecKind::OpenApi => {
            if let Some(Value::Object(schemes)) = root
                .get("components")
                .and_then(|c| c.get("securitySchemes"))
            {
                for (name, scheme) in schemes {
                    validate_security_scheme(name, scheme)?;
                }
            }
        }
        SpecKind::Swagger => {
            if let Some(Value::Object(definitions)) = root.get("securityDefinitions") {
                for (name, scheme) in definitions {
                    validate_swagger_security_scheme(name, scheme)?;
                }
            }
        }
    }

    if !root.contains_key("info") {
        return Err(ValidationError::MissingField("info".to_string()));
    }
    let paths_optional = version == SpecKind::OpenApi && !is_openapi_30(root);
    if paths_optional {
        if !["paths", "components", "webhooks"]
            .iter()
            .any(|k| root.contains_key(*k))
        {
            return Err(ValidationError::MissingField(
                "paths, components or webhooks".to_string(),
            ));
        }
    } else if !root.contains_key("paths") {
        return Err(ValidationError::MissingField("paths".to_string()));
    }
    Ok(())
}

fn check_version(raw: &Value, root: &Map<String, Value>) -> Result<SpecKind, ValidationError> {
    let Some(version) = get_spec_version(raw) else {
        return match root.get("openapi").or_else(|| root.get("swagger")) {
            Some(other) => Err(ValidationError::UnsupportedVersion(other.to_string())),
            None => Err(ValidationError::MissingField("openapi".to_string())),
        };
    };
    let supported = match version.kind {
        SpecKind::OpenApi => version.version.starts_with("3."),
        SpecKind::Swagger => version.version.starts_with("2."),
    };
    if !supported {
        return Err(ValidationError::UnsupportedVersion(version.to_string()));
    }
    Ok(version.kind)
}

fn is_openapi_30(root: &Map<String, Value>) -> bool {
    root.get("openapi")
        .and_then(Value::as_str)
        .is_some_and(|v| v.starts_with("3.0"))
}

fn validate_path_item_servers(path: &str, item: &Value) -> Result<(), ValidationError> {
    let Some(item) = item.as_object() else {
        return Ok(());
    };
    if let Some(servers) = item.get("servers") {
        validate_servers(servers, &format!("paths.{path}.servers"))?;
    }
    let additional = item
        .get("additionalOperations")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|ops| ops.iter());
    let fixed = OPERATION_KEYS
        .iter()
        .filter_map(|k| item.get(*k).map(|op| (k.to_string(), op)));
    let operations: Vec<(String, &Value)> = fixed
        .chain(additional.map(|(k, op)| (k.clone(), op)))
        .collect();
    for (method, op) in operations {
        if let Some(servers) = op.get("servers") {
            validate_servers(servers, &format!("paths.{path}.{method}.servers"))?;
        }
    }
    Ok(())
}

/// Check one `servers` array: variables complete, defaults declared, enums
/// consistent and names unique.
pub fn validate_servers(servers: &Value, location: &str) -> Result<(), ValidationError> {
    let Some(servers) = servers.as_array() else {
        return Err(ValidationError::InvalidServer {
            location: location.to_string(),
            message: "servers must be an array".to_string(),
        });
    };
    let mut names = HashSet::new();
    for (i, server) in servers.iter().enumerate() {
        let entry = format!("{location}[{i}]");
        let Some(url) = server.get("url").and_then(Value::as_str) else {
            return Err(ValidationError::InvalidServer {
                location: entry,
                message: "url is required and must be a string".to_string(),
            });
        };
        let variables = match server.get("variables") {
            None => Map::new(),
            Some(Value::Object(vars)) => vars.clone(),
            Some(_) => {
                return Err(ValidationError::InvalidServer {
                    location: entry,
                    message: "variables must be an object".to_string(),
                });
            }
        };
        for variable in url_variables(url) {
            if !variables.contains_key(&variable) {
                return Err(ValidationError::UndefinedServerVariable {
                    url: url.to_string(),
                    variable,
                });
            }
        }
        for (variable, definition) in &variables {
            validate_server_variable(url, variable, definition)?;
        }
        if let Some(name) = server.get("name").and_then(Value::as_str) {
            if !names.insert(name.to_string()) {
                return Err(ValidationError::DuplicateServerName(name.to_string()));
            }
        }
    }
    Ok(())
}

fn validate_server_variable(
    url: &str,
    variable: &str,
    definition: &Value,
) -> Result<(), ValidationError> {
    let Some(default) = definition.get("default").and_then(Value::as_str) else {
        return Err(ValidationError::MissingVariableDefault {
            url: url.to_string(),
            variable: variable.to_string(),
        });
    };
    let enum_error = |message: &str| ValidationError::InvalidVariableEnum {
        url: url.to_string(),
        variable: variable.to_string(),
        message: message.to_string(),
    };
    match definition.get("enum") {
        None => Ok(()),
        Some(Value::Array(values)) => {
            if values.is_empty() {
                return Err(enum_error("enum must not be empty"));
            }
            if !values.iter().all(Value::is_string) {
                return Err(enum_error("enum values must be strings"));
            }
            if !values.iter().any(|v| v.as_str() == Some(default)) {
                return Err(enum_error(&format!(
                    "default \"{default}\" is not one of the enum values"
                )));
            }
            Ok(())
        }
        Some(_) => Err(enum_error("enum must be an array")),
    }
}

/// Check one OpenAPI 3.x security scheme. References are left to resolution.
pub fn validate_security_scheme(name: &str, scheme: &Value) -> Result<(), ValidationError> {
    if scheme.get("$ref").is_some() {
        return Ok(());
    }
    let invalid = |message: String| ValidationError::InvalidSecurityScheme {
        name: name.to_string(),
        message,
    };
    let Some(scheme_type) = scheme.get("type").and_then(Value::as_str) else {
        return Err(invalid("type is required".to_string()));
    };
    match scheme_type {
        "apiKey" => validate_api_key(scheme).map_err(invalid),
        "http" => {
            if non_empty_str(scheme, "scheme").is_none() {
                return Err(invalid("http scheme requires a non-empty \"scheme\"".to_string()));
            }
            Ok(())
        }
        "oauth2" => match scheme.get("flows") {
            Some(Value::Object(flows)) if !flows.is_empty() => Ok(()),
            _ => Err(invalid(
                "oauth2 scheme requires a non-empty \"flows\" object".to_string(),
            )),
        },
        "openIdConnect" => {
            let Some(url) = non_empty_str(scheme, "openIdConnectUrl") else {
                return Err(invalid(
                    "openIdConnect scheme requires \"openIdConnectUrl\"".to_string(),
                ));
            };
            match Url::parse(url) {
                Ok(parsed) if parsed.scheme() == "https" => Ok(()),
                _ => Err(invalid(format!(
                    "openIdConnectUrl \"{url}\" must use the https scheme"
                ))),
            }
        }
        "mutualTLS" => Ok(()),
        other => Err(invalid(format!("unknown type \"{other}\""))),
    }
}

/// Check one Swagger 2.0 `securityDefinitions` entry.
pub fn validate_swagger_security_scheme(
    name: &str,
    scheme: &Value,
) -> Result<(), ValidationError> {
    let invalid = |message: String| ValidationError::InvalidSecurityScheme {
        name: name.to_string(),
        message,
    };
    let Some(scheme_type) = scheme.get("type").and_then(Value::as_str) else {
        return Err(invalid("type is required".to_string()));
    };
    match scheme_type {
        "basic" => Ok(()),
        "apiKey" => validate_api_key(scheme).map_err(invalid),
        "oauth2" => {
            let Some(flow) = non_empty_str(scheme, "flow") else {
                return Err(invalid("oauth2 definition requires \"flow\"".to_string()));
            };
            let (needs_auth_url, needs_token_url) = match flow {
                "implicit" => (true, false),
                "password" | "application" => (false, true),
                "accessCode" => (true, true),
                other => return Err(invalid(format!("unknown oauth2 flow \"{other}\""))),
            };
            if needs_auth_url && non_empty_str(scheme, "authorizationUrl").is_none() {
                return Err(invalid(format!(
                    "oauth2 flow \"{flow}\" requires \"authorizationUrl\""
                )));
            }
            if needs_token_url && non_empty_str(scheme, "tokenUrl").is_none() {
                return Err(invalid(format!("oauth2 flow \"{flow}\" requires \"tokenUrl\"")));
            }
            Ok(())
        }
        other => Err(invalid(format!("unknown type \"{other}\""))),
    }
}

fn validate_api_key(scheme: &Value) -> Result<(), String> {
    if non_empty_str(scheme, "name").is_none() {
        return Err("apiKey scheme requires a non-empty \"name\"".to_string());
    }
    match non_empty_str(scheme, "in") {
        Some("query" | "header" | "cookie") => Ok(()),
        Some(other) => Err(format!(
            "apiKey \"in\" must be query, header or cookie, got \"{other}\""
        )),
        None => Err("apiKey scheme requires a non-empty \"in\"".to_string()),
    }
}

fn non_empty_str<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(extra: Value) -> Value {
        let mut base = json!({
            "openapi": "3.2.0",
            "info": {"title": "t", "version": "1"},
            "paths": {}
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        base
    }

    #[test]
    fn test_minimal_document_is_valid() {
        assert_eq!(validate_spec(&doc(json!({}))), Ok(()));
    }

    #[test]
    fn test_undefined_server_variable() {
        let err = validate_spec(&json!({
            "openapi": "3.2.0",
            "servers": [{"url": "https://{env}.x.com", "variables": {}}]
        }))
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"server URL "https://{env}.x.com" uses variable "env" which is not defined in variables"#);
    }

    #[test]
    fn test_duplicate_server_names() {
        let err = validate_spec(&doc(json!({
            "servers": [
                {"url": "https://a.x.com", "name": "prod"},
                {"url": "https://b.x.com", "name": "prod"}
            ]
        })))
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"server name "prod" must be unique"#);
    }

    #[test]
    fn test_variable_default_required() {
        let err = validate_spec(&doc(json!({
            "servers": [{"url": "https://{env}.x.com", "variables": {"env": {"enum": ["a"]}}}]
        })))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingVariableDefault {
                url: "https://{env}.x.com".to_string(),
                variable: "env".to_string()
            }
        );
    }

    #[test]
    fn test_variable_enum_must_contain_default() {
        let err = validate_spec(&doc(json!({
            "servers": [{"url": "https://{env}.x.com",
                         "variables": {"env": {"default": "dev", "enum": ["prod"]}}}]
        })))
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"server variable "env" of "https://{env}.x.com": default "dev" is not one of the enum values"#);
    }

    #[test]
    fn test_operation_servers_are_checked() {
        let err = validate_spec(&doc(json!({
            "paths": {"/pets": {"get": {"servers": [{"url": "https://{region}.x.com"}]}}}
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::UndefinedServerVariable { .. }));
    }

    #[test]
    fn test_api_key_requires_name_and_in() {
        let err = validate_spec(&doc(json!({
            "components": {"securitySchemes": {"key": {"type": "apiKey", "in": "header"}}}
        })))
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"security scheme "key": apiKey scheme requires a non-empty "name""#);

        let err = validate_spec(&doc(json!({
            "components": {"securitySchemes": {"key": {"type": "apiKey", "name": "k", "in": "body"}}}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("must be query, header or cookie"));
    }

    #[test]
    fn test_http_requires_scheme() {
        let err = validate_spec(&doc(json!({
            "components": {"securitySchemes": {"basic": {"type": "http", "scheme": ""}}}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("\"scheme\""));
    }

    #[test]
    fn test_oauth2_requires_flows() {
        let err = validate_spec(&doc(json!({
            "components": {"securitySchemes": {"oauth": {"type": "oauth2", "flows": {}}}}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("flows"));
    }

    #[test]
    fn test_open_id_connect_requires_https() {
        let err = validate_spec(&doc(json!({
            "components": {"securitySchemes": {"oidc": {
                "type": "openIdConnect",
                "openIdConnectUrl": "http://id.example.com/.well-known/openid-configuration"
            }}}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("must use the https scheme"));

        let ok = doc(json!({
            "components": {"securitySchemes": {"oidc": {
                "type": "openIdConnect",
                "openIdConnectUrl": "https://id.example.com/.well-known/openid-configuration"
            }}}
        }));
        assert_eq!(validate_spec(&ok), Ok(()));
    }

    #[test]
    fn test_unknown_scheme_type() {
        let err = validate_spec(&doc(json!({
            "components": {"securitySchemes": {"x": {"type": "magic"}}}
        })))
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @r#"security scheme "x": unknown type "magic""#);
    }

    #[test]
    fn test_swagger_security_definitions() {
        let base = json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "securityDefinitions": {"oauth": {"type": "oauth2", "flow": "accessCode",
                                              "authorizationUrl": "https://x/auth"}}
        });
        let err = validate_spec(&base).unwrap_err();
        assert!(err.to_string().contains("requires \"tokenUrl\""));
    }

    #[test]
    fn test_version_checks() {
        assert_eq!(
            validate_spec(&json!({"info": {}, "paths": {}})),
            Err(ValidationError::MissingField("openapi".to_string()))
        );
        assert!(matches!(
            validate_spec(&json!({"openapi": "4.0.0", "info": {}, "paths": {}})),
            Err(ValidationError::UnsupportedVersion(_))
        ));
        assert_eq!(validate_spec(&json!([])), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn test_required_sections() {
        assert_eq!(
            validate_spec(&json!({"openapi": "3.1.0", "paths": {}})),
            Err(ValidationError::MissingField("info".to_string()))
        );
        assert_eq!(
            validate_spec(&json!({"openapi": "3.0.3", "info": {}})),
            Err(ValidationError::MissingField("paths".to_string()))
        );
        // 3.1+ documents may carry only webhooks or components.
        assert_eq!(
            validate_spec(&json!({"openapi": "3.1.0", "info": {}, "webhooks": {}})),
            Ok(())
        );
    }
}
