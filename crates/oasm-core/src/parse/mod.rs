//! Typed grammar of OpenAPI 3.x and Swagger 2.0 documents.

pub mod components;
pub mod document;
pub mod extensions;
pub mod link;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;
pub mod swagger;

pub use document::{ApiDocument, SpecKind, SpecVersion, get_spec_version};

use crate::error::{SpecLoadError, ValidationError};
use crate::validate::validate_spec;

/// Parse and validate a single, self-contained document from YAML.
pub fn from_yaml(input: &str) -> Result<ApiDocument, SpecLoadError> {
    let raw: serde_json::Value =
        serde_yaml_ng::from_str(input).map_err(|e| SpecLoadError::Parse {
            uri: "<inline>".to_string(),
            message: e.to_string(),
        })?;
    decode(&raw)
}

/// Parse and validate a single, self-contained document from JSON.
pub fn from_json(input: &str) -> Result<ApiDocument, SpecLoadError> {
    let raw: serde_json::Value = serde_json::from_str(input).map_err(|e| SpecLoadError::Parse {
        uri: "<inline>".to_string(),
        message: e.to_string(),
    })?;
    decode(&raw)
}

fn decode(raw: &serde_json::Value) -> Result<ApiDocument, SpecLoadError> {
    validate_spec(raw)?;
    ApiDocument::from_value(raw).map_err(|message| match get_spec_version(raw) {
        None => SpecLoadError::Validation(ValidationError::MissingField(
            "openapi or swagger".to_string(),
        )),
        Some(_) => SpecLoadError::Decode {
            uri: "<inline>".to_string(),
            message,
        },
    })
}
