//! The read-only semantic model handed to emitters.

use indexmap::IndexMap;
use url::Url;

use crate::analyze::{
    BodyVariant, DecodeHint, ParamSerialization, ResponseVariant, SerializationAnalyzer,
};
use crate::config::ModelConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{ModelError, SpecLoadError};
use crate::ir::grouping::group_resources;
use crate::ir::{IrSchema, LinkInfo, PathInfo, Resource};
use crate::parse::document::{ApiDocument, SpecVersion, get_spec_version};
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::security::{SecurityRequirement, SecurityScheme, SecuritySchemeOrRef};
use crate::parse::server::Server;
use crate::resolve::fetch::DocumentFetcher;
use crate::resolve::{DocumentCache, LoadedSpec, ReferenceResolver, SpecLoader};
use crate::transform::discriminator::{
    DiscriminatorRegistry, PolymorphicOption, polymorphic_schema_options,
};
use crate::transform::paths::{ExtractOptions, extract_paths_with_options, normalize_security};
use crate::transform::registry::{NamedSchema, SchemaRegistry};
use crate::transform::schema_resolver::TypeMapper;

/// A fully resolved API: operations, schemas, discriminators and resources,
/// plus the document cache that backs every later reference lookup.
#[derive(Debug)]
pub struct ApiModel {
    document: ApiDocument,
    raw: serde_json::Value,
    document_uri: Url,
    cache: DocumentCache,
    diagnostics: Diagnostics,
    config: ModelConfig,
    operations: Vec<PathInfo>,
    webhooks: Vec<PathInfo>,
    schemas: SchemaRegistry,
    discriminators: DiscriminatorRegistry,
    resources: Vec<Resource>,
}

impl ApiModel {
    /// Load `entry` with the default fetcher and build with default options.
    pub fn load(entry: &str) -> Result<Self, ModelError> {
        Self::load_with(&SpecLoader::new(), entry, &ModelConfig::default())
    }

    pub fn load_with<F: DocumentFetcher>(
        loader: &SpecLoader<F>,
        entry: &str,
        config: &ModelConfig,
    ) -> Result<Self, ModelError> {
        let loaded = loader.load(entry)?;
        Self::build(loaded, config)
    }

    /// Decode the entry document and derive every view of it.
    pub fn build(loaded: LoadedSpec, config: &ModelConfig) -> Result<Self, ModelError> {
        let LoadedSpec {
            entry_spec,
            document_uri,
            cache,
            diagnostics,
        } = loaded;
        let document =
            ApiDocument::from_value(&entry_spec).map_err(|message| SpecLoadError::Decode {
                uri: document_uri.to_string(),
                message,
            })?;

        let (operations, webhooks, schemas, discriminators) = {
            let resolver = ReferenceResolver::new(&cache, document_uri.clone(), &diagnostics);
            let options = ExtractOptions {
                resolver: Some(&resolver),
                components: document.components(),
                consumes: document.consumes(),
                produces: document.produces(),
            };
            let operations = extract_paths_with_options(document.paths(), &options);
            let webhooks = document
                .webhooks()
                .map(|hooks| extract_paths_with_options(hooks, &options))
                .unwrap_or_default();

            let mut schemas = match document.schema_definitions() {
                Some(definitions) => SchemaRegistry::from_definitions(definitions, Some(&resolver)),
                None => SchemaRegistry::new(),
            };
            let discriminators =
                DiscriminatorRegistry::build(&mut schemas, Some(&resolver), &diagnostics);
            (operations, webhooks, schemas, discriminators)
        };
        let resources = group_resources(&operations, &config.options.naming, &schemas);

        log::debug!(
            "built model: {} operation(s), {} webhook(s), {} schema(s), {} discriminator(s)",
            operations.len(),
            webhooks.len(),
            schemas.len(),
            discriminators.len()
        );

        Ok(Self {
            document,
            raw: entry_spec,
            document_uri,
            cache,
            diagnostics,
            config: config.clone(),
            operations,
            webhooks,
            schemas,
            discriminators,
            resources,
        })
    }

    /// A resolver over this model's cache.
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&self.cache, self.document_uri.clone(), &self.diagnostics)
    }

    pub fn document(&self) -> &ApiDocument {
        &self.document
    }

    pub fn document_uri(&self) -> &Url {
        &self.document_uri
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn operations(&self) -> &[PathInfo] {
        &self.operations
    }

    pub fn webhooks(&self) -> &[PathInfo] {
        &self.webhooks
    }

    /// Every registered schema as `{name, definition}`, in registry order.
    pub fn schemas(&self) -> Vec<NamedSchema> {
        self.schemas.entries()
    }

    pub fn schema_registry(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn discriminators(&self) -> &DiscriminatorRegistry {
        &self.discriminators
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn servers(&self) -> Vec<Server> {
        self.document.servers()
    }

    /// Response links of every operation and webhook.
    pub fn links(&self) -> Vec<&LinkInfo> {
        self.operations
            .iter()
            .chain(&self.webhooks)
            .flat_map(|op| &op.links)
            .collect()
    }

    /// Security schemes by name, with referenced schemes resolved.
    /// Schemes whose reference cannot be resolved are left out.
    pub fn security_schemes(&self) -> IndexMap<String, SecurityScheme> {
        let resolver = self.resolver();
        self.document
            .security_schemes()
            .into_iter()
            .filter_map(|(name, scheme)| {
                let scheme = match scheme {
                    SecuritySchemeOrRef::Scheme(scheme) => *scheme,
                    SecuritySchemeOrRef::Ref { ref_path, .. } => {
                        resolver.resolve_ref_as::<SecurityScheme>(&ref_path)?
                    }
                };
                Some((name, scheme))
            })
            .collect()
    }

    /// The operation's own security requirements, else the document's.
    pub fn effective_security(&self, operation: &PathInfo) -> Vec<SecurityRequirement> {
        match &operation.security {
            Some(requirements) => requirements.clone(),
            None => self
                .document
                .security()
                .map(normalize_security)
                .unwrap_or_default(),
        }
    }

    pub fn resolve_reference(&self, reference: &str) -> Option<serde_json::Value> {
        self.resolver().resolve_reference(reference)
    }

    pub fn polymorphic_schema_options(&self, schema: &Schema) -> Vec<PolymorphicOption> {
        polymorphic_schema_options(schema, &self.resolver())
    }

    pub fn spec_version(&self) -> Option<SpecVersion> {
        get_spec_version(&self.raw)
    }

    /// The registry mapped onto IR schemas under the configured options.
    pub fn ir_schemas(&self) -> Vec<IrSchema> {
        let mapper = TypeMapper::new(&self.config.options);
        self.schemas
            .iter()
            .map(|(name, schema)| mapper.ir_schema(name, schema, self.discriminators.get(name)))
            .collect()
    }

    pub fn param_serializations(&self, operation: &PathInfo) -> Vec<ParamSerialization> {
        let resolver = self.resolver();
        self.analyzer(&resolver).parameters(operation)
    }

    pub fn body_variant(&self, operation: &PathInfo) -> Option<BodyVariant> {
        let resolver = self.resolver();
        self.analyzer(&resolver).body(operation)
    }

    pub fn response_variants(&self, operation: &PathInfo) -> Vec<ResponseVariant> {
        let resolver = self.resolver();
        self.analyzer(&resolver).responses(operation)
    }

    /// Encoded-content locations inside a payload schema.
    pub fn decode_hints(&self, schema: &SchemaOrRef) -> Vec<DecodeHint> {
        let resolver = self.resolver();
        self.analyzer(&resolver).decode_hints(schema)
    }

    fn analyzer<'r, 'a>(
        &'r self,
        resolver: &'r ReferenceResolver<'a>,
    ) -> SerializationAnalyzer<'r, 'a> {
        SerializationAnalyzer::new(
            Some(resolver),
            &self.diagnostics,
            self.config.analysis.auto_decode_depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Inline(String);

    impl DocumentFetcher for Inline {
        fn fetch(&self, _uri: &Url) -> Result<String, SpecLoadError> {
            Ok(self.0.clone())
        }
    }

    fn model(spec: serde_json::Value) -> ApiModel {
        let loader = SpecLoader::with_fetcher(Inline(spec.to_string()));
        ApiModel::load_with(&loader, "https://api.test/openapi.json", &ModelConfig::default())
            .unwrap()
    }

    #[test]
    fn test_effective_security_falls_back_to_document() {
        let m = model(json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1"},
            "security": [{"#/components/securitySchemes/key": []}],
            "components": {"securitySchemes": {
                "key": {"type": "apiKey", "name": "X-Key", "in": "header"}
            }},
            "paths": {
                "/a": {"get": {"responses": {"200": {"description": "ok"}}}},
                "/b": {"get": {"security": [], "responses": {"200": {"description": "ok"}}}}
            }
        }));
        let ops = m.operations();
        let inherited = m.effective_security(&ops[0]);
        assert_eq!(inherited[0].keys().collect::<Vec<_>>(), vec!["key"]);
        assert!(m.effective_security(&ops[1]).is_empty());
        assert!(m.security_schemes().contains_key("key"));
    }

    #[test]
    fn test_spec_version_and_ir_schemas() {
        let m = model(json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {"schemas": {
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
                "Color": {"type": "string", "enum": ["red", "blue"]}
            }}
        }));
        let version = m.spec_version().unwrap();
        assert_eq!(version.version, "3.0.3");
        let kinds: Vec<&str> = m
            .ir_schemas()
            .iter()
            .map(|s| match s {
                IrSchema::Object(_) => "object",
                IrSchema::Enum(_) => "enum",
                IrSchema::Alias(_) => "alias",
                IrSchema::Union(_) => "union",
            })
            .collect();
        assert_eq!(kinds, vec!["object", "enum"]);
    }
}
