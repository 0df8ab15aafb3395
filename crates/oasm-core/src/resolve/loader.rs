use std::collections::HashSet;
use std::path::Path;

use url::Url;

use super::cache::{DocumentCache, canonical_key};
use super::fetch::{DefaultFetcher, DocumentFetcher};
use super::ref_resolve::{
    ReferenceResolver, find_refs, index_schema_ids, invalid_refs, rebase_refs,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::SpecLoadError;
use crate::validate::validate_spec;

/// Everything one `load` produced: the validated entry document, its
/// canonical URI, every transitively referenced document, and the soft
/// failures met on the way.
#[derive(Debug)]
pub struct LoadedSpec {
    pub entry_spec: serde_json::Value,
    pub document_uri: Url,
    pub cache: DocumentCache,
    pub diagnostics: Diagnostics,
}

impl LoadedSpec {
    /// A resolver over this run's cache, reporting into its diagnostics.
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&self.cache, self.document_uri.clone(), &self.diagnostics)
    }
}

/// Loads an entry document and every document it references.
#[derive(Debug, Default)]
pub struct SpecLoader<F: DocumentFetcher = DefaultFetcher> {
    fetcher: F,
}

impl SpecLoader<DefaultFetcher> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: DocumentFetcher> SpecLoader<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch, parse and validate the entry document, then load its
    /// references recursively.
    ///
    /// Failures on the entry document are errors; failures on referenced
    /// documents are recorded as diagnostics and skipped.
    pub fn load(&self, entry: &str) -> Result<LoadedSpec, SpecLoadError> {
        let document_uri = location_to_url(entry)?;
        let text = self.fetcher.fetch(&document_uri)?;
        let entry_spec = parse_document(&text, &document_uri)?;
        validate_spec(&entry_spec)?;

        let mut cache = DocumentCache::new();
        let diagnostics = Diagnostics::new();
        let mut visited = HashSet::new();

        let key = canonical_key(&document_uri);
        visited.insert(key.clone());
        cache.insert(key.clone(), entry_spec.clone());
        register_self(&entry_spec, &document_uri, &key, &mut cache);
        index_schema_ids(&entry_spec, &document_uri, &mut cache);

        self.load_references(
            &entry_spec,
            &document_uri,
            &mut cache,
            &mut visited,
            &diagnostics,
        );
        log::debug!("loaded {} document(s) from {entry}", cache.len());

        Ok(LoadedSpec {
            entry_spec,
            document_uri,
            cache,
            diagnostics,
        })
    }

    fn load_references(
        &self,
        document: &serde_json::Value,
        document_uri: &Url,
        cache: &mut DocumentCache,
        visited: &mut HashSet<String>,
        diagnostics: &Diagnostics,
    ) {
        for (pointer, value) in invalid_refs(document) {
            diagnostics.warn(
                DiagnosticKind::UnsupportedConstruct,
                format!("Ignoring non-string $ref {value} at {document_uri}#{pointer}"),
            );
        }

        // Rebasing first resolves every reference against its own `$id` scope.
        let mut scoped = document.clone();
        rebase_refs(&mut scoped, document_uri);

        for reference in find_refs(&scoped) {
            let target = match Url::parse(&reference) {
                Ok(url) => url,
                Err(e) => {
                    diagnostics.warn(
                        DiagnosticKind::UnreachableDocument,
                        format!("Malformed reference URI \"{reference}\" in {document_uri}: {e}"),
                    );
                    continue;
                }
            };
            let key = canonical_key(&target);
            if visited.contains(&key) || cache.contains(&key) {
                continue;
            }
            // Mark before recursing so a cycle back to this document stops here.
            visited.insert(key.clone());

            let loaded = self
                .fetcher
                .fetch(&target)
                .and_then(|text| parse_document(&text, &target));
            let sub_document = match loaded {
                Ok(doc) => doc,
                Err(e) => {
                    diagnostics.warn(
                        DiagnosticKind::UnreachableDocument,
                        format!("Skipping referenced document: {e}"),
                    );
                    continue;
                }
            };
            let mut target_url = target.clone();
            target_url.set_fragment(None);
            log::debug!("loaded referenced document {key}");

            cache.insert(key.clone(), sub_document.clone());
            register_self(&sub_document, &target_url, &key, cache);
            index_schema_ids(&sub_document, &target_url, cache);
            self.load_references(&sub_document, &target_url, cache, visited, diagnostics);
        }
    }
}

/// Load with the default file/HTTP fetcher.
pub fn load(entry: &str) -> Result<LoadedSpec, SpecLoadError> {
    SpecLoader::new().load(entry)
}

/// Cache a document under its declared `$self` URI as well.
fn register_self(document: &serde_json::Value, uri: &Url, key: &str, cache: &mut DocumentCache) {
    let Some(self_uri) = document.get("$self").and_then(|v| v.as_str()) else {
        return;
    };
    match uri.join(self_uri) {
        Ok(declared) => {
            let alias = canonical_key(&declared);
            log::debug!("aliasing {alias} to {key}");
            cache.alias(alias, key);
        }
        Err(e) => log::debug!("ignoring invalid $self {self_uri:?}: {e}"),
    }
}

/// Turn an entry location into an absolute URI. `http(s)://` and `file://`
/// are taken as-is; anything else is a filesystem path.
pub fn location_to_url(location: &str) -> Result<Url, SpecLoadError> {
    let invalid = |message: String| SpecLoadError::InvalidUri {
        uri: location.to_string(),
        message,
    };
    if location.starts_with("http://")
        || location.starts_with("https://")
        || location.starts_with("file://")
    {
        return Url::parse(location).map_err(|e| invalid(e.to_string()));
    }
    let absolute = std::path::absolute(Path::new(location)).map_err(|e| invalid(e.to_string()))?;
    Url::from_file_path(&absolute).map_err(|()| invalid("not an absolute path".to_string()))
}

/// Parse document text as JSON or YAML.
///
/// `.yaml`/`.yml` documents are tried as YAML first; everything else as
/// JSON first. The error of the preferred format is reported when both fail.
pub fn parse_document(text: &str, uri: &Url) -> Result<serde_json::Value, SpecLoadError> {
    let path = uri.path().to_ascii_lowercase();
    let yaml_first = path.ends_with(".yaml") || path.ends_with(".yml");

    let as_json = || serde_json::from_str::<serde_json::Value>(text).map_err(|e| e.to_string());
    let as_yaml =
        || serde_yaml_ng::from_str::<serde_json::Value>(text).map_err(|e| e.to_string());

    let result = if yaml_first {
        as_yaml().or_else(|primary| as_json().map_err(|_| primary))
    } else {
        as_json().or_else(|primary| as_yaml().map_err(|_| primary))
    };
    result.map_err(|message| SpecLoadError::Parse {
        uri: uri.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_and_yaml() {
        let json_url = Url::parse("https://x/spec.json").unwrap();
        let yaml_url = Url::parse("https://x/spec.yaml").unwrap();
        assert_eq!(
            parse_document(r#"{"a": 1}"#, &json_url).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(parse_document("a: 1\n", &yaml_url).unwrap(), json!({"a": 1}));
        // No extension: JSON first, then YAML.
        let bare = Url::parse("https://x/spec").unwrap();
        assert_eq!(parse_document("a: [1, 2]\n", &bare).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_parse_failure_names_document() {
        let url = Url::parse("https://x/spec.json").unwrap();
        let err = parse_document("{ not: [valid", &url).unwrap_err();
        assert!(matches!(err, SpecLoadError::Parse { .. }));
        assert!(err.to_string().contains("https://x/spec.json"));
    }

    #[test]
    fn test_location_to_url() {
        let remote = location_to_url("https://example.com/openapi.yaml").unwrap();
        assert_eq!(remote.scheme(), "https");
        let local = location_to_url("specs/openapi.yaml").unwrap();
        assert_eq!(local.scheme(), "file");
        assert!(local.path().ends_with("/specs/openapi.yaml"));
    }
}
