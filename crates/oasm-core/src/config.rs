use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

/// Top-level project configuration loaded from `.oasm.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub input: String,
    pub options: ModelOptions,
    pub analysis: AnalysisOptions,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            options: ModelOptions::default(),
            analysis: AnalysisOptions::default(),
        }
    }
}

/// Options steering type mapping and naming during normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub date_type: DateType,
    pub int64_type: Int64Type,
    pub enum_style: EnumStyle,
    pub naming: NamingConfig,
}

/// How `format: date` / `format: date-time` strings are typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    #[default]
    String,
    Date,
}

/// How `format: int64` integers are typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Int64Type {
    #[default]
    Number,
    BigInt,
    String,
}

/// Whether string enums become named enums or literal unions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumStyle {
    #[default]
    Enum,
    Union,
}

/// Naming strategy and aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub strategy: NamingStrategy,
    /// Map from resolved operation name (operationId or route-derived) to custom method name.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            strategy: NamingStrategy::UseOperationId,
            aliases: IndexMap::new(),
        }
    }
}

/// How operation method names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

/// Serialization analysis knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Nesting bound when looking for `contentEncoding`/`contentSchema`.
    pub auto_decode_depth: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            auto_decode_depth: DEFAULT_AUTO_DECODE_DEPTH,
        }
    }
}

pub const DEFAULT_AUTO_DECODE_DEPTH: usize = 6;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oasm.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ModelConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ModelConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oasm configuration
input: openapi.yaml   # local path, file:// URI or http(s):// URL

options:
  date_type: string     # string | date
  int64_type: number    # number | big_int | string
  enum_style: enum      # enum | union
  naming:
    strategy: use_operation_id  # use_operation_id | use_route_based
    aliases: {}
      # createChatCompletion: chat     # operation name → custom method name

analysis:
  auto_decode_depth: 6  # nesting bound for contentEncoding/contentSchema detection
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.options.date_type, DateType::String);
        assert_eq!(config.options.int64_type, Int64Type::Number);
        assert_eq!(config.options.enum_style, EnumStyle::Enum);
        assert_eq!(config.options.naming.strategy, NamingStrategy::UseOperationId);
        assert!(config.options.naming.aliases.is_empty());
        assert_eq!(config.analysis.auto_decode_depth, 6);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: https://api.example.com/openapi.json
options:
  date_type: date
  int64_type: big_int
  enum_style: union
  naming:
    strategy: use_route_based
    aliases:
      listPets: pets
analysis:
  auto_decode_depth: 3
"#;
        let config: ModelConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "https://api.example.com/openapi.json");
        assert_eq!(config.options.date_type, DateType::Date);
        assert_eq!(config.options.int64_type, Int64Type::BigInt);
        assert_eq!(config.options.enum_style, EnumStyle::Union);
        assert_eq!(config.options.naming.strategy, NamingStrategy::UseRouteBased);
        assert_eq!(config.options.naming.aliases["listPets"], "pets");
        assert_eq!(config.analysis.auto_decode_depth, 3);
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = "input: api.yaml\n";
        let config: ModelConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        assert_eq!(config.analysis.auto_decode_depth, DEFAULT_AUTO_DECODE_DEPTH);
    }

    #[test]
    fn test_default_content_parses() {
        let config: ModelConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.input, "openapi.yaml");
    }
}
