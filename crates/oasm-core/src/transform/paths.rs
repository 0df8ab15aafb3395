use indexmap::IndexMap;
use url::Url;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::ir::{CallbackInfo, HttpMethod, LinkInfo, PathInfo};
use crate::parse::components::Components;
use crate::parse::link::{Callback, CallbackOrRef, Link, LinkOrRef};
use crate::parse::media_type::MediaType;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::ref_target_name;
use crate::parse::security::SecurityRequirement;
use crate::resolve::{DocumentCache, ReferenceResolver};

/// Base URI of the synthetic document used when no resolver is supplied.
const INLINE_DOCUMENT_URI: &str = "file:///inline/openapi.json";

const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Context for extraction beyond the paths map itself.
#[derive(Clone, Copy, Default)]
pub struct ExtractOptions<'a> {
    /// Resolver for `$ref`s. Without one, local references are looked up in
    /// `components`.
    pub resolver: Option<&'a ReferenceResolver<'a>>,
    pub components: Option<&'a Components>,
    /// Document-level Swagger 2.0 `consumes`.
    pub consumes: &'a [String],
    /// Document-level Swagger 2.0 `produces`.
    pub produces: &'a [String],
}

/// Flatten a paths (or webhooks) map into one [`PathInfo`] per operation.
pub fn extract_paths(
    paths: &IndexMap<String, PathItem>,
    resolver: Option<&ReferenceResolver<'_>>,
    components: Option<&Components>,
) -> Vec<PathInfo> {
    extract_paths_with_options(
        paths,
        &ExtractOptions {
            resolver,
            components,
            ..ExtractOptions::default()
        },
    )
}

/// Flatten a paths map with explicit Swagger 2.0 defaults.
pub fn extract_paths_with_options(
    paths: &IndexMap<String, PathItem>,
    options: &ExtractOptions<'_>,
) -> Vec<PathInfo> {
    match options.resolver {
        Some(resolver) => PathExtractor::new(resolver, options).extract(paths),
        None => {
            let Some((cache, root_uri)) = inline_document(options.components) else {
                return Vec::new();
            };
            let diagnostics = Diagnostics::new();
            let resolver = ReferenceResolver::new(&cache, root_uri, &diagnostics);
            PathExtractor::new(&resolver, options).extract(paths)
        }
    }
}

/// A cache holding only `components`, so local references resolve the same
/// way with or without a loaded document.
fn inline_document(components: Option<&Components>) -> Option<(DocumentCache, Url)> {
    let root = Url::parse(INLINE_DOCUMENT_URI).ok()?;
    let mut cache = DocumentCache::new();
    let components = components
        .and_then(|c| serde_json::to_value(c).ok())
        .unwrap_or_else(|| serde_json::json!({}));
    cache.insert(
        INLINE_DOCUMENT_URI,
        serde_json::json!({ "components": components }),
    );
    Some((cache, root))
}

struct PathExtractor<'r, 'a> {
    resolver: &'r ReferenceResolver<'a>,
    consumes: &'r [String],
    produces: &'r [String],
}

impl<'r, 'a> PathExtractor<'r, 'a> {
    fn new(resolver: &'r ReferenceResolver<'a>, options: &ExtractOptions<'r>) -> Self {
        Self {
            resolver,
            consumes: options.consumes,
            produces: options.produces,
        }
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.resolver.diagnostics()
    }

    fn extract(&self, paths: &IndexMap<String, PathItem>) -> Vec<PathInfo> {
        let mut out = Vec::new();
        for (path, item) in paths {
            let item = self.resolve_path_item(path, item);
            out.extend(self.extract_path_item(path, &item));
        }
        out
    }

    fn resolve_path_item(&self, path: &str, item: &PathItem) -> PathItem {
        let Some(ref_path) = &item.ref_path else {
            return item.clone();
        };
        match self.resolver.resolve_ref_as::<PathItem>(ref_path) {
            Some(target) => item.merged_over(target),
            None => {
                log::debug!("path item {path} keeps only its local fields");
                item.merged_over(PathItem::default())
            }
        }
    }

    fn extract_path_item(&self, path: &str, item: &PathItem) -> Vec<PathInfo> {
        let item_params = self.resolve_parameters(&item.parameters);
        item.operations()
            .into_iter()
            .map(|(method, op)| self.extract_operation(path, method, op, item, &item_params))
            .collect()
    }

    fn extract_operation(
        &self,
        path: &str,
        method: HttpMethod,
        op: &Operation,
        item: &PathItem,
        item_params: &[Parameter],
    ) -> PathInfo {
        let mut info = PathInfo::new(method, path);
        info.operation_id = op.operation_id.clone();
        info.summary = op.summary.clone().or_else(|| item.summary.clone());
        info.description = op.description.clone().or_else(|| item.description.clone());
        info.tags = op.tags.clone();
        info.deprecated = op.deprecated.unwrap_or(false);
        info.extensions = op.extensions.clone();
        info.servers = if op.servers.is_empty() {
            item.servers.clone()
        } else {
            op.servers.clone()
        };
        info.security = op.security.as_ref().map(|reqs| normalize_security(reqs));

        let merged = merge_parameters(item_params, &self.resolve_parameters(&op.parameters));
        let mut body_param = None;
        for param in merged {
            match param.location {
                ParameterLocation::Body => body_param = Some(param),
                ParameterLocation::FormData => info.form_fields.push(param),
                _ => info.parameters.push(param),
            }
        }

        let legacy = body_param.is_some() || !info.form_fields.is_empty();
        if legacy {
            info.consumes = effective_media_types(&op.consumes, self.consumes);
        }
        info.request_body = match &op.request_body {
            Some(body) => self.resolve_request_body(body),
            None => body_param.map(|param| self.legacy_request_body(param, &info.consumes)),
        };

        let produces = effective_media_types(&op.produces, self.produces);
        for (status, response) in &op.responses {
            let Some(mut response) = self.resolve_response(response) else {
                continue;
            };
            if let Some(schema) = response.schema.take() {
                if response.content.is_empty() {
                    for media_type in &produces {
                        response
                            .content
                            .insert(media_type.clone(), MediaType::with_schema(schema.clone()));
                    }
                }
            }
            let links = self.extract_links(&info, status, &response.links);
            info.links.extend(links);
            info.responses.insert(status.clone(), response);
        }

        for (name, callback) in &op.callbacks {
            let Some(callback) = self.resolve_callback(callback) else {
                continue;
            };
            for (expression, callback_item) in &callback {
                let callback_item = self.resolve_path_item(expression, callback_item);
                info.callbacks.push(CallbackInfo {
                    name: name.clone(),
                    expression: expression.clone(),
                    operations: self.extract_path_item(expression, &callback_item),
                });
            }
        }
        info
    }

    /// Swagger 2.0 `in: body` parameter as a request body, one media type
    /// entry per effective `consumes` value.
    fn legacy_request_body(&self, param: Parameter, consumes: &[String]) -> RequestBody {
        let mut body = RequestBody {
            description: param.description.clone(),
            required: param.required,
            ..RequestBody::default()
        };
        if let Some(schema) = &param.schema {
            for media_type in consumes {
                body.content
                    .insert(media_type.clone(), MediaType::with_schema(schema.clone()));
            }
        }
        body
    }

    fn resolve_parameters(&self, params: &[ParameterOrRef]) -> Vec<Parameter> {
        params
            .iter()
            .filter_map(|p| match p {
                ParameterOrRef::Parameter(p) => Some((**p).clone()),
                ParameterOrRef::Ref { .. } => self.resolver.resolve_node(p),
            })
            .collect()
    }

    fn resolve_request_body(&self, body: &RequestBodyOrRef) -> Option<RequestBody> {
        match body {
            RequestBodyOrRef::RequestBody(b) => Some(b.clone()),
            RequestBodyOrRef::Ref { .. } => self.resolver.resolve_node(body),
        }
    }

    fn resolve_response(&self, response: &ResponseOrRef) -> Option<Response> {
        match response {
            ResponseOrRef::Response(r) => Some((**r).clone()),
            ResponseOrRef::Ref { .. } => self.resolver.resolve_node(response),
        }
    }

    fn resolve_callback(&self, callback: &CallbackOrRef) -> Option<Callback> {
        match callback {
            CallbackOrRef::Callback(c) => Some(c.clone()),
            // Decoded through the enum so `x-*` keys of the target are skipped.
            CallbackOrRef::Ref { .. } => match self.resolver.resolve_node(callback)? {
                CallbackOrRef::Callback(c) => Some(c),
                CallbackOrRef::Ref { .. } => None,
            },
        }
    }

    fn extract_links(
        &self,
        source: &PathInfo,
        status: &str,
        links: &IndexMap<String, LinkOrRef>,
    ) -> Vec<LinkInfo> {
        links
            .iter()
            .filter_map(|(name, link)| {
                let link: Link = match link {
                    LinkOrRef::Link(l) => l.clone(),
                    LinkOrRef::Ref { .. } => self.resolver.resolve_node(link)?,
                };
                if link.operation_id.is_none() && link.operation_ref.is_none() {
                    self.diagnostics().warn(
                        DiagnosticKind::UnsupportedConstruct,
                        format!(
                            "Link \"{name}\" of {} ({status}) names no target operation",
                            source.display_name()
                        ),
                    );
                }
                Some(LinkInfo {
                    name: name.clone(),
                    source: source.display_name(),
                    status: status.to_string(),
                    link,
                })
            })
            .collect()
    }
}

/// Path-item parameters overlaid by operation parameters on `(name, in)`.
pub fn merge_parameters(item_params: &[Parameter], op_params: &[Parameter]) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = item_params.to_vec();
    for param in op_params {
        match merged.iter_mut().find(|p| p.key() == param.key()) {
            Some(existing) => *existing = param.clone(),
            None => merged.push(param.clone()),
        }
    }
    merged
}

/// Rewrite requirement keys given as pointers to a scheme
/// (`#/components/securitySchemes/X`) to the bare scheme name.
pub fn normalize_security(requirements: &[SecurityRequirement]) -> Vec<SecurityRequirement> {
    requirements
        .iter()
        .map(|req| {
            req.iter()
                .map(|(key, scopes)| (normalize_security_key(key), scopes.clone()))
                .collect()
        })
        .collect()
}

pub fn normalize_security_key(key: &str) -> String {
    if key.contains("#/") {
        ref_target_name(key)
    } else {
        key.to_string()
    }
}

fn effective_media_types(operation: &[String], document: &[String]) -> Vec<String> {
    if !operation.is_empty() {
        operation.to_vec()
    } else if !document.is_empty() {
        document.to_vec()
    } else {
        vec![DEFAULT_MEDIA_TYPE.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(value: serde_json::Value) -> IndexMap<String, PathItem> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_swagger_body_parameter_becomes_request_body() {
        let p = paths(json!({
            "/test": {"post": {"parameters": [
                {"name": "body", "in": "body", "schema": {"type": "string"}}
            ]}}
        }));
        let infos = extract_paths(&p, None, None);
        assert_eq!(infos.len(), 1);
        let body = infos[0].request_body.as_ref().unwrap();
        let schema = body.content["application/json"].schema.as_ref().unwrap();
        assert_eq!(serde_json::to_value(schema).unwrap(), json!({"type": "string"}));
        assert!(infos[0].parameters.is_empty());
    }

    #[test]
    fn test_operation_parameters_override_path_item() {
        let p = paths(json!({
            "/pets/{id}": {
                "parameters": [
                    {"name": "id", "in": "path", "required": true, "description": "item"},
                    {"name": "trace", "in": "header"}
                ],
                "get": {"parameters": [
                    {"name": "id", "in": "path", "required": true, "description": "op"},
                    {"name": "id", "in": "query"}
                ]}
            }
        }));
        let infos = extract_paths(&p, None, None);
        let params = &infos[0].parameters;
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].description.as_deref(), Some("op"));
        assert_eq!(params[1].name, "trace");
        assert_eq!(params[2].location, ParameterLocation::Query);
    }

    #[test]
    fn test_missing_parameters_normalize_to_empty() {
        let p = paths(json!({"/ping": {"get": {}}}));
        let infos = extract_paths(&p, None, None);
        assert!(infos[0].parameters.is_empty());
        assert!(infos[0].responses.is_empty());
    }

    #[test]
    fn test_security_pointer_keys_are_normalized() {
        let p = paths(json!({
            "/me": {"get": {"security": [
                {"#/components/securitySchemes/MyAuth": ["read"]},
                {"apiKey": []}
            ]}}
        }));
        let infos = extract_paths(&p, None, None);
        let security = infos[0].security.as_ref().unwrap();
        assert_eq!(security[0].get("MyAuth"), Some(&vec!["read".to_string()]));
        assert!(security[0].get("#/components/securitySchemes/MyAuth").is_none());
        assert!(security[1].contains_key("apiKey"));
    }

    #[test]
    fn test_component_references_without_resolver() {
        let components: Components = serde_json::from_value(json!({
            "parameters": {"Limit": {"name": "limit", "in": "query", "x-max": 100}},
            "responses": {"NotFound": {"description": "missing"}}
        }))
        .unwrap();
        let p = paths(json!({
            "/pets": {"get": {
                "parameters": [{"$ref": "#/components/parameters/Limit"}],
                "responses": {"404": {"$ref": "#/components/responses/NotFound"}}
            }}
        }));
        let infos = extract_paths(&p, None, Some(&components));
        assert_eq!(infos[0].parameters[0].name, "limit");
        assert_eq!(
            infos[0].parameters[0].extensions.get("x-max"),
            Some(&json!(100))
        );
        assert_eq!(
            infos[0].responses["404"].description.as_deref(),
            Some("missing")
        );
    }

    #[test]
    fn test_unresolvable_parameter_is_dropped() {
        let p = paths(json!({
            "/pets": {"get": {"parameters": [{"$ref": "#/components/parameters/Nope"}]}}
        }));
        let infos = extract_paths(&p, None, None);
        assert!(infos[0].parameters.is_empty());
    }

    #[test]
    fn test_swagger_response_schema_uses_produces() {
        let p = paths(json!({
            "/pets": {"get": {
                "produces": ["application/xml"],
                "responses": {"200": {"description": "ok", "schema": {"type": "array"}}}
            }}
        }));
        let infos = extract_paths(&p, None, None);
        let response = &infos[0].responses["200"];
        assert!(response.schema.is_none());
        assert!(response.content.contains_key("application/xml"));
    }

    #[test]
    fn test_form_data_fields() {
        let p = paths(json!({
            "/upload": {"post": {
                "consumes": ["multipart/form-data"],
                "parameters": [
                    {"name": "file", "in": "formData", "type": "file"},
                    {"name": "note", "in": "formData", "type": "string"}
                ]
            }}
        }));
        let info = &extract_paths(&p, None, None)[0];
        assert_eq!(info.form_fields.len(), 2);
        assert_eq!(info.consumes, vec!["multipart/form-data"]);
        assert!(info.request_body.is_none());
    }

    #[test]
    fn test_servers_extensions_and_methods() {
        let p = paths(json!({
            "/items": {
                "servers": [{"url": "https://items.example.com"}],
                "get": {"x-rate-limit": 5},
                "post": {"servers": [{"url": "https://write.example.com"}]},
                "additionalOperations": {"PURGE": {}}
            }
        }));
        let infos = extract_paths(&p, None, None);
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].servers[0].url, "https://items.example.com");
        assert_eq!(infos[0].extensions.get("x-rate-limit"), Some(&json!(5)));
        assert_eq!(infos[1].servers[0].url, "https://write.example.com");
        assert_eq!(infos[2].method, HttpMethod::Other("PURGE".into()));
    }

    #[test]
    fn test_callbacks_and_links() {
        let p = paths(json!({
            "/subscribe": {"post": {
                "operationId": "subscribe",
                "responses": {"201": {
                    "description": "created",
                    "links": {"Unsubscribe": {"operationId": "unsubscribe"}}
                }},
                "callbacks": {"onEvent": {
                    "{$request.body#/callbackUrl}": {"post": {"operationId": "eventCallback"}}
                }}
            }}
        }));
        let info = &extract_paths(&p, None, None)[0];
        assert_eq!(info.callbacks.len(), 1);
        assert_eq!(info.callbacks[0].name, "onEvent");
        assert_eq!(
            info.callbacks[0].operations[0].operation_id.as_deref(),
            Some("eventCallback")
        );
        assert_eq!(info.links.len(), 1);
        assert_eq!(info.links[0].source, "subscribe");
        assert_eq!(info.links[0].status, "201");
    }

    #[test]
    fn test_path_item_reference_with_local_summary() {
        let components: Components = serde_json::from_value(json!({
            "pathItems": {"Pets": {"summary": "shared", "get": {"operationId": "listPets"}}}
        }))
        .unwrap();
        let p = paths(json!({
            "/pets": {"$ref": "#/components/pathItems/Pets", "summary": "local"}
        }));
        let infos = extract_paths(&p, None, Some(&components));
        assert_eq!(infos[0].operation_id.as_deref(), Some("listPets"));
        assert_eq!(infos[0].summary.as_deref(), Some("local"));
    }
}
