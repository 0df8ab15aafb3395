use indexmap::IndexMap;
use serde::Serialize;

use super::operations::{HttpMethod, PathInfo};
use super::types::NormalizedName;
use crate::config::NamingConfig;
use crate::parse::media_type::MediaType;
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::transform::name_normalizer::{
    method_name, normalize_name, path_ends_with_param, resource_segments,
};
use crate::transform::registry::SchemaRegistry;

/// CRUD role of an operation within its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceAction {
    List,
    Create,
    GetById,
    Update,
    Delete,
    Custom,
}

impl ResourceAction {
    /// Classify by verb and whether the path addresses a single item.
    pub fn classify(method: &HttpMethod, path: &str) -> Self {
        let single = path_ends_with_param(path);
        match method {
            HttpMethod::Get if single => ResourceAction::GetById,
            HttpMethod::Get => ResourceAction::List,
            HttpMethod::Post if !single => ResourceAction::Create,
            HttpMethod::Put | HttpMethod::Patch if single => ResourceAction::Update,
            HttpMethod::Delete if single => ResourceAction::Delete,
            _ => ResourceAction::Custom,
        }
    }
}

/// An operation placed in a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOperation {
    pub action: ResourceAction,
    pub method_name: String,
    pub operation: PathInfo,
    /// Registered schema name of the request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<String>,
    /// Registered schema name of the first success response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<String>,
}

/// A property seen on some schema an operation of the resource exchanges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceProperty {
    pub name: String,
    /// Name of the owning schema in the registry.
    pub schema: String,
    pub required: bool,
}

/// Operations grouped by tag, or by path prefix when untagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub name: NormalizedName,
    pub operations: Vec<ResourceOperation>,
    pub properties: Vec<ResourceProperty>,
}

/// Group operations into resources, in first-seen order.
pub fn group_resources(
    operations: &[PathInfo],
    naming: &NamingConfig,
    schemas: &SchemaRegistry,
) -> Vec<Resource> {
    let mut groups: IndexMap<String, Vec<ResourceOperation>> = IndexMap::new();

    for info in operations {
        let key = info
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| extract_path_prefix(&info.path));
        let method_name = method_name(info, naming);
        let mut operation = info.clone();
        operation.method_name = Some(method_name.clone());
        groups.entry(key).or_default().push(ResourceOperation {
            action: ResourceAction::classify(&info.method, &info.path),
            method_name,
            request_schema: request_schema_name(info, schemas),
            response_schema: response_schema_name(info, schemas),
            operation,
        });
    }

    groups
        .into_iter()
        .map(|(key, operations)| {
            let properties = aggregate_properties(&operations, schemas);
            Resource {
                name: normalize_name(&key),
                operations,
                properties,
            }
        })
        .collect()
}

/// Extract the first meaningful path segment as a group name.
/// e.g. "/pets/{petId}" → "pets", "/store/inventory" → "store"
fn extract_path_prefix(path: &str) -> String {
    resource_segments(path)
        .first()
        .unwrap_or(&"default")
        .to_string()
}

fn request_schema_name(info: &PathInfo, schemas: &SchemaRegistry) -> Option<String> {
    let body = info.request_body.as_ref()?;
    content_schema_name(&body.content, schemas)
}

fn response_schema_name(info: &PathInfo, schemas: &SchemaRegistry) -> Option<String> {
    info.responses
        .iter()
        .filter(|(status, _)| status.starts_with('2'))
        .find_map(|(_, response)| content_schema_name(&response.content, schemas))
}

/// Registered name of the first media type schema, looking through arrays.
fn content_schema_name(
    content: &IndexMap<String, MediaType>,
    schemas: &SchemaRegistry,
) -> Option<String> {
    content
        .values()
        .filter_map(|media| media.schema.as_ref().or(media.item_schema.as_ref()))
        .find_map(|schema| registered_name(schema, schemas))
}

fn registered_name(schema: &SchemaOrRef, schemas: &SchemaRegistry) -> Option<String> {
    match schema {
        SchemaOrRef::Ref { ref_path, .. } => schemas.name_for_ref(ref_path),
        SchemaOrRef::Schema(s) => s
            .items
            .as_deref()
            .and_then(|items| registered_name(items, schemas)),
        SchemaOrRef::Boolean(_) => None,
    }
}

fn aggregate_properties(
    operations: &[ResourceOperation],
    schemas: &SchemaRegistry,
) -> Vec<ResourceProperty> {
    let mut properties: IndexMap<String, ResourceProperty> = IndexMap::new();
    let names = operations
        .iter()
        .flat_map(|op| [op.response_schema.as_ref(), op.request_schema.as_ref()])
        .flatten();
    for name in names {
        if let Some(schema) = schemas.get(name) {
            collect_properties(name, schema, schemas, &mut properties, 0);
        }
    }
    properties.into_values().collect()
}

const MAX_ALL_OF_DEPTH: usize = 8;

fn collect_properties(
    owner: &str,
    schema: &Schema,
    schemas: &SchemaRegistry,
    out: &mut IndexMap<String, ResourceProperty>,
    depth: usize,
) {
    if depth > MAX_ALL_OF_DEPTH {
        return;
    }
    for part in &schema.all_of {
        match part {
            SchemaOrRef::Ref { ref_path, .. } => {
                if let Some((name, parent)) = schemas
                    .name_for_ref(ref_path)
                    .and_then(|n| schemas.get(&n).map(|s| (n, s)))
                {
                    collect_properties(&name, parent, schemas, out, depth + 1);
                }
            }
            SchemaOrRef::Schema(inline) => {
                collect_properties(owner, inline, schemas, out, depth + 1)
            }
            SchemaOrRef::Boolean(_) => {}
        }
    }
    for name in schema.properties.keys() {
        out.entry(name.clone()).or_insert_with(|| ResourceProperty {
            name: name.clone(),
            schema: owner.to_string(),
            required: schema.required.contains(name),
        });
    }
}
