use std::fmt;

use heck::ToLowerCamelCase;
use serde::Serialize;

use super::media::MediaKind;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parse::parameter::{Parameter, ParameterLocation};

/// Parameter serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamStyle {
    Matrix,
    Label,
    Simple,
    Form,
    /// OpenAPI 3.2 cookie style.
    Cookie,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParamStyle {
    pub fn parse(style: &str) -> Option<Self> {
        match style {
            "matrix" => Some(ParamStyle::Matrix),
            "label" => Some(ParamStyle::Label),
            "simple" => Some(ParamStyle::Simple),
            "form" => Some(ParamStyle::Form),
            "cookie" => Some(ParamStyle::Cookie),
            "spaceDelimited" => Some(ParamStyle::SpaceDelimited),
            "pipeDelimited" => Some(ParamStyle::PipeDelimited),
            "deepObject" => Some(ParamStyle::DeepObject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamStyle::Matrix => "matrix",
            ParamStyle::Label => "label",
            ParamStyle::Simple => "simple",
            ParamStyle::Form => "form",
            ParamStyle::Cookie => "cookie",
            ParamStyle::SpaceDelimited => "spaceDelimited",
            ParamStyle::PipeDelimited => "pipeDelimited",
            ParamStyle::DeepObject => "deepObject",
        }
    }

    /// Default style for a location.
    pub fn default_for(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path | ParameterLocation::Header => ParamStyle::Simple,
            ParameterLocation::Query
            | ParameterLocation::Querystring
            | ParameterLocation::Cookie
            | ParameterLocation::FormData
            | ParameterLocation::Body => ParamStyle::Form,
        }
    }

    /// `explode` when the parameter does not set it: only form styles explode.
    pub fn default_explode(&self) -> bool {
        matches!(self, ParamStyle::Form | ParamStyle::Cookie)
    }

    pub fn allowed_in(&self, location: ParameterLocation) -> bool {
        match location {
            ParameterLocation::Path => matches!(
                self,
                ParamStyle::Matrix | ParamStyle::Label | ParamStyle::Simple
            ),
            ParameterLocation::Query
            | ParameterLocation::Querystring
            | ParameterLocation::FormData => matches!(
                self,
                ParamStyle::Form
                    | ParamStyle::SpaceDelimited
                    | ParamStyle::PipeDelimited
                    | ParamStyle::DeepObject
            ),
            ParameterLocation::Header => matches!(self, ParamStyle::Simple),
            ParameterLocation::Cookie => matches!(self, ParamStyle::Form | ParamStyle::Cookie),
            ParameterLocation::Body => false,
        }
    }
}

impl fmt::Display for ParamStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a content-based parameter is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SerializationLink {
    /// The value is JSON-encoded before style serialization.
    Json,
}

/// Serialization strategy of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSerialization {
    /// Identifier-safe camelCase name.
    pub param_name: String,
    pub original_name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub style: ParamStyle,
    pub explode: bool,
    pub allow_reserved: bool,
    /// Media type of a `content`-based parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serialization_link: Option<SerializationLink>,
}

/// Derive the serialization of a parameter. Explicit `style`, `explode` and
/// `allowReserved` always win over the location defaults. `body` parameters
/// have no parameter serialization.
pub fn analyze_parameter(param: &Parameter, diagnostics: &Diagnostics) -> Option<ParamSerialization> {
    if param.location == ParameterLocation::Body {
        return None;
    }

    let (style, legacy_explode) = match (&param.style, &param.legacy.collection_format) {
        (Some(style), _) => (explicit_style(param, style, diagnostics), None),
        (None, Some(format)) => collection_format_style(param, format, diagnostics),
        (None, None) => (ParamStyle::default_for(param.location), None),
    };
    let explode = param
        .explode
        .or(legacy_explode)
        .unwrap_or_else(|| style.default_explode());

    let content_type = param.content.keys().next().cloned();
    let serialization_link = content_type
        .as_deref()
        .filter(|ct| MediaKind::of(ct) == MediaKind::Json)
        .map(|_| SerializationLink::Json);

    Some(ParamSerialization {
        param_name: param.name.to_lower_camel_case(),
        original_name: param.name.clone(),
        location: param.location,
        style,
        explode,
        allow_reserved: param.allow_reserved.unwrap_or(false),
        content_type,
        serialization_link,
    })
}

fn explicit_style(param: &Parameter, style: &str, diagnostics: &Diagnostics) -> ParamStyle {
    let Some(parsed) = ParamStyle::parse(style) else {
        diagnostics.warn(
            DiagnosticKind::UnsupportedConstruct,
            format!(
                "Parameter '{}' uses unknown style '{style}'; using the {} default",
                param.name,
                param.location.as_str()
            ),
        );
        return ParamStyle::default_for(param.location);
    };
    if !parsed.allowed_in(param.location) {
        diagnostics.warn(
            DiagnosticKind::UnsupportedConstruct,
            format!(
                "Parameter '{}' uses style '{parsed}' which is not allowed in {}",
                param.name,
                param.location.as_str()
            ),
        );
    }
    parsed
}

/// Swagger 2.0 `collectionFormat` as a style and explode pair.
fn collection_format_style(
    param: &Parameter,
    format: &str,
    diagnostics: &Diagnostics,
) -> (ParamStyle, Option<bool>) {
    match format {
        "csv" => (ParamStyle::default_for(param.location), Some(false)),
        "ssv" => (ParamStyle::SpaceDelimited, Some(false)),
        "pipes" => (ParamStyle::PipeDelimited, Some(false)),
        "multi" => (ParamStyle::Form, Some(true)),
        other => {
            diagnostics.warn(
                DiagnosticKind::UnsupportedConstruct,
                format!(
                    "Parameter '{}' uses unsupported collectionFormat '{other}'",
                    param.name
                ),
            );
            (ParamStyle::default_for(param.location), Some(false))
        }
    }
}
