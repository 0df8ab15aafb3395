use indexmap::IndexMap;
use serde::Serialize;

use super::name_normalizer::schema_name_from_uri;
use super::registry::SchemaRegistry;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parse::schema::{Schema, SchemaOrRef, ref_target_name};
use crate::resolve::{ReferenceResolver, inline_schema};

/// Normalized discriminator of a polymorphic parent schema.
///
/// Every mapping value is the name of a schema in the [`SchemaRegistry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscriminatorInfo {
    pub property_name: String,
    pub mapping: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mapping: Option<String>,
}

/// Parent schema name → normalized discriminator.
#[derive(Debug, Clone, Default)]
pub struct DiscriminatorRegistry {
    entries: IndexMap<String, DiscriminatorInfo>,
}

impl DiscriminatorRegistry {
    /// Collect the discriminators of every registered schema.
    ///
    /// Mapping targets that live outside the registry are resolved and
    /// registered under the last segment of their pointer, or their file name
    /// when they address a whole document. A name already held by a different
    /// schema gets a numeric suffix. Targets that cannot be resolved are
    /// dropped with a diagnostic.
    pub fn build(
        schemas: &mut SchemaRegistry,
        resolver: Option<&ReferenceResolver<'_>>,
        diagnostics: &Diagnostics,
    ) -> Self {
        let parents: Vec<(String, Schema)> = schemas
            .iter()
            .filter(|(_, s)| s.discriminator.is_some())
            .map(|(n, s)| (n.clone(), s.clone()))
            .collect();

        let mut entries = IndexMap::new();
        for (parent, schema) in parents {
            let Some(discriminator) = &schema.discriminator else {
                continue;
            };
            let property = &discriminator.property_name;
            let mut mapping = IndexMap::new();

            for (value, target) in &discriminator.mapping {
                match register_mapping_target(schemas, target, resolver) {
                    Some(name) => {
                        mapping.insert(value.clone(), name);
                    }
                    None => diagnostics.warn(
                        DiagnosticKind::DroppedMapping,
                        format!(
                            "Dropped discriminator mapping '{value}' -> '{target}' on schema '{parent}'"
                        ),
                    ),
                }
            }

            // Union branches the explicit mapping does not cover.
            for branch in schema.union_variants() {
                let Some(ref_path) = branch.ref_path() else {
                    continue;
                };
                let Some(name) = register_mapping_target(schemas, ref_path, resolver) else {
                    continue;
                };
                if mapping.values().any(|n| *n == name) {
                    continue;
                }
                let value = schemas
                    .get(&name)
                    .and_then(|s| inferred_value(s, property, resolver))
                    .unwrap_or_else(|| name.clone());
                mapping.entry(value).or_insert(name);
            }

            // Children that extend the parent through `allOf`.
            let children: Vec<(String, Option<String>)> = schemas
                .iter()
                .filter(|(name, _)| **name != parent)
                .filter(|(_, s)| extends(s, &parent))
                .map(|(name, s)| (name.clone(), inferred_value(s, property, resolver)))
                .collect();
            for (child, value) in children {
                if mapping.values().any(|n| *n == child) {
                    continue;
                }
                mapping.entry(value.unwrap_or_else(|| child.clone())).or_insert(child);
            }

            let default_mapping = discriminator
                .default_mapping
                .as_deref()
                .and_then(|target| register_mapping_target(schemas, target, resolver));

            entries.insert(
                parent,
                DiscriminatorInfo {
                    property_name: property.clone(),
                    mapping,
                    default_mapping,
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, parent: &str) -> Option<&DiscriminatorInfo> {
        self.entries.get(parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DiscriminatorInfo)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One concrete branch of a discriminated union.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolymorphicOption {
    /// The discriminator value selecting this branch.
    pub name: String,
    pub schema: Schema,
}

/// Expand a discriminated `oneOf`/`anyOf` into `(value, branch schema)` pairs.
///
/// Returns nothing unless the schema has both union branches and a
/// discriminator property. A branch's value comes from the explicit mapping
/// or, failing that, from a single-valued `enum` or `const` on the
/// discriminator property. Branches without a value are dropped.
pub fn polymorphic_schema_options(
    schema: &Schema,
    resolver: &ReferenceResolver<'_>,
) -> Vec<PolymorphicOption> {
    let Some(discriminator) = &schema.discriminator else {
        return Vec::new();
    };
    let property = &discriminator.property_name;
    let mut options = Vec::new();

    for branch in schema.union_variants() {
        let Some(resolved) = inline_schema(branch, Some(resolver)) else {
            continue;
        };
        let mapped = branch.ref_path().and_then(|ref_path| {
            discriminator
                .mapping
                .iter()
                .find(|(_, target)| mapping_targets_match(target, ref_path, resolver))
                .map(|(value, _)| value.clone())
        });
        match mapped.or_else(|| inferred_value(&resolved, property, Some(resolver))) {
            Some(name) => options.push(PolymorphicOption {
                name,
                schema: resolved,
            }),
            None => resolver.diagnostics().warn(
                DiagnosticKind::DroppedMapping,
                format!(
                    "Dropped union branch {} with no value for discriminator '{property}'",
                    branch.ref_path().unwrap_or("<inline>")
                ),
            ),
        }
    }
    options
}

/// Find or register the schema a mapping target names.
fn register_mapping_target(
    schemas: &mut SchemaRegistry,
    target: &str,
    resolver: Option<&ReferenceResolver<'_>>,
) -> Option<String> {
    if schemas.contains(target) {
        return Some(target.to_string());
    }
    if let Some(name) = schemas.name_for_ref(target) {
        return Some(name);
    }
    let resolver = resolver?;
    let schema: Schema = resolver.resolve_ref_as(target)?;
    let base = mapping_target_name(target);
    if base.is_empty() {
        return None;
    }
    let mut candidate = base.clone();
    let mut suffix = 2;
    loop {
        match schemas.get(&candidate) {
            Some(existing) if *existing == schema => return Some(candidate),
            Some(_) => {
                candidate = format!("{base}{suffix}");
                suffix += 1;
            }
            None => {
                schemas.register(candidate.clone(), schema);
                return Some(candidate);
            }
        }
    }
}

/// `common.json#/Dog` is `Dog`; `./models/pet-owner.yaml` is `PetOwner`.
fn mapping_target_name(target: &str) -> String {
    target
        .split_once('#')
        .map(|_| ref_target_name(target))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| schema_name_from_uri(target))
}

/// The single value a branch fixes for the discriminator property, looking
/// through its own properties and then its `allOf` parts.
fn inferred_value(
    schema: &Schema,
    property: &str,
    resolver: Option<&ReferenceResolver<'_>>,
) -> Option<String> {
    let own = schema
        .properties
        .get(property)
        .and_then(|prop| inline_schema(prop, resolver))
        .and_then(|prop| single_value(&prop));
    if own.is_some() {
        return own;
    }
    schema
        .all_of
        .iter()
        .filter_map(|part| inline_schema(part, resolver))
        .filter_map(|part| part.properties.get(property).cloned())
        .filter_map(|prop| inline_schema(&prop, resolver))
        .find_map(|prop| single_value(&prop))
}

fn single_value(schema: &Schema) -> Option<String> {
    if let [only] = schema.enum_values.as_slice() {
        return only.as_str().map(str::to_string);
    }
    schema
        .const_value
        .as_ref()
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn extends(schema: &Schema, parent: &str) -> bool {
    schema
        .all_of
        .iter()
        .filter_map(SchemaOrRef::ref_path)
        .any(|r| r.starts_with('#') && ref_target_name(r) == parent)
}

/// Whether a mapping value and a branch reference name the same schema.
/// Bare names match local component references; anything else is compared
/// as an absolute URI.
fn mapping_targets_match(target: &str, ref_path: &str, resolver: &ReferenceResolver<'_>) -> bool {
    if target == ref_path {
        return true;
    }
    if !target.contains(['#', '/']) && ref_path.starts_with('#') {
        return ref_target_name(ref_path) == target;
    }
    match (resolver.absolute_uri(target), resolver.absolute_uri(ref_path)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
