use indexmap::IndexMap;
use serde::Serialize;

use crate::parse::components::ComponentKind;
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::resolve::ReferenceResolver;

/// A named schema definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSchema {
    pub name: String,
    pub definition: Schema,
}

/// Ordered name → definition map of every schema the model knows.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `components.schemas` or `definitions`. Top-level aliases
    /// (`Pet: {$ref: ...}`) are resolved so every entry is a real schema;
    /// aliases that do not resolve are left out.
    pub fn from_definitions(
        definitions: &IndexMap<String, SchemaOrRef>,
        resolver: Option<&ReferenceResolver<'_>>,
    ) -> Self {
        let mut registry = Self::new();
        for (name, schema) in definitions {
            let definition = match schema {
                SchemaOrRef::Schema(s) => Some((**s).clone()),
                SchemaOrRef::Boolean(true) => Some(Schema::default()),
                SchemaOrRef::Boolean(false) => Some(Schema {
                    not: Some(Box::new(SchemaOrRef::Boolean(true))),
                    ..Schema::default()
                }),
                SchemaOrRef::Ref { .. } => resolver.and_then(|r| r.resolve_node(schema)),
            };
            if let Some(definition) = definition {
                registry.register(name.clone(), definition);
            }
        }
        registry
    }

    /// Register a schema under `name` unless the name is taken.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> bool {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return false;
        }
        self.schemas.insert(name, schema);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.schemas.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.schemas.keys()
    }

    /// The `{name, definition}` sequence exposed to emitters.
    pub fn entries(&self) -> Vec<NamedSchema> {
        self.schemas
            .iter()
            .map(|(name, definition)| NamedSchema {
                name: name.clone(),
                definition: definition.clone(),
            })
            .collect()
    }

    /// Registered name of a local schema reference
    /// (`#/components/schemas/X`, `#/definitions/X`).
    pub fn name_for_ref(&self, ref_path: &str) -> Option<String> {
        match ComponentKind::parse_local_ref(ref_path) {
            Some((ComponentKind::Schemas, name)) if self.contains(&name) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_definitions_keeps_order() {
        let defs: IndexMap<String, SchemaOrRef> = serde_json::from_value(json!({
            "Zebra": {"type": "object"},
            "Apple": {"type": "string"},
            "Open": true
        }))
        .unwrap();
        let registry = SchemaRegistry::from_definitions(&defs, None);
        let names: Vec<&String> = registry.names().collect();
        assert_eq!(names, vec!["Zebra", "Apple", "Open"]);
        assert_eq!(registry.entries()[1].name, "Apple");
    }

    #[test]
    fn test_unresolved_alias_is_skipped_without_resolver() {
        let defs: IndexMap<String, SchemaOrRef> =
            serde_json::from_value(json!({"Alias": {"$ref": "#/components/schemas/Pet"}}))
                .unwrap();
        assert!(SchemaRegistry::from_definitions(&defs, None).is_empty());
    }

    #[test]
    fn test_name_for_ref() {
        let mut registry = SchemaRegistry::new();
        registry.register("Pet", Schema::default());
        assert!(!registry.register("Pet", Schema::default()));
        assert_eq!(
            registry.name_for_ref("#/components/schemas/Pet"),
            Some("Pet".to_string())
        );
        assert_eq!(registry.name_for_ref("#/definitions/Pet"), Some("Pet".to_string()));
        assert_eq!(registry.name_for_ref("#/components/schemas/Dog"), None);
    }
}
