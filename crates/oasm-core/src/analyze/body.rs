use indexmap::IndexMap;
use serde::Serialize;

use super::media::MediaKind;
use super::params::{ParamSerialization, ParamStyle, analyze_parameter};
use super::xml::{XmlConfig, root_name, xml_config};
use crate::diagnostics::Diagnostics;
use crate::ir::PathInfo;
use crate::parse::media_type::{Encoding, MediaType};
use crate::parse::parameter::Parameter;
use crate::parse::request_body::RequestBody;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::resolve::{ReferenceResolver, inline_schema};

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Encoding of one multipart part or url-encoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartEncoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    pub style: ParamStyle,
    pub explode: bool,
    pub allow_reserved: bool,
}

/// A Swagger 2.0 `formData` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub serialization: ParamSerialization,
    pub required: bool,
    pub binary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// The one serialization strategy chosen for a request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum BodyVariant {
    Json {
        content_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<SchemaOrRef>,
    },
    JsonLines {
        content_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        item_schema: Option<SchemaOrRef>,
    },
    JsonSeq {
        content_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        item_schema: Option<SchemaOrRef>,
    },
    Xml {
        content_type: String,
        root_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<SchemaOrRef>,
        config: XmlConfig,
    },
    Multipart {
        content_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<SchemaOrRef>,
        encoding: IndexMap<String, PartEncoding>,
    },
    Urlencoded {
        content_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<SchemaOrRef>,
        encoding: IndexMap<String, PartEncoding>,
    },
    Raw {
        content_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<SchemaOrRef>,
        binary: bool,
    },
    /// Flat form fields without a structured body (Swagger 2.0 `formData`).
    EncodedFormData {
        content_type: String,
        fields: Vec<FormField>,
    },
}

impl BodyVariant {
    pub fn kind(&self) -> &'static str {
        match self {
            BodyVariant::Json { .. } => "json",
            BodyVariant::JsonLines { .. } => "json-lines",
            BodyVariant::JsonSeq { .. } => "json-seq",
            BodyVariant::Xml { .. } => "xml",
            BodyVariant::Multipart { .. } => "multipart",
            BodyVariant::Urlencoded { .. } => "urlencoded",
            BodyVariant::Raw { .. } => "raw",
            BodyVariant::EncodedFormData { .. } => "encoded-form-data",
        }
    }

    pub fn content_type(&self) -> &str {
        match self {
            BodyVariant::Json { content_type, .. }
            | BodyVariant::JsonLines { content_type, .. }
            | BodyVariant::JsonSeq { content_type, .. }
            | BodyVariant::Xml { content_type, .. }
            | BodyVariant::Multipart { content_type, .. }
            | BodyVariant::Urlencoded { content_type, .. }
            | BodyVariant::Raw { content_type, .. }
            | BodyVariant::EncodedFormData { content_type, .. } => content_type,
        }
    }
}

/// Body variant of an operation: its request body, else its form fields.
pub fn analyze_body(
    info: &PathInfo,
    resolver: Option<&ReferenceResolver<'_>>,
    diagnostics: &Diagnostics,
) -> Option<BodyVariant> {
    match &info.request_body {
        Some(body) => analyze_request_body(body, resolver),
        None => analyze_form_fields(&info.form_fields, &info.consumes, diagnostics),
    }
}

/// Pick one variant among the declared media types by priority
/// (json, json-lines, json-seq, xml, multipart, urlencoded, raw). Ties go to
/// the first declared.
pub fn analyze_request_body(
    body: &RequestBody,
    resolver: Option<&ReferenceResolver<'_>>,
) -> Option<BodyVariant> {
    let (content_type, media) = body
        .content
        .iter()
        .min_by_key(|(ct, _)| MediaKind::of(ct).body_priority())?;
    let content_type = content_type.clone();
    let schema = media.schema.clone();

    let variant = match MediaKind::of(&content_type) {
        MediaKind::Json => BodyVariant::Json {
            content_type,
            schema,
        },
        MediaKind::JsonLines => BodyVariant::JsonLines {
            content_type,
            item_schema: item_schema(media, resolver),
        },
        MediaKind::JsonSeq => BodyVariant::JsonSeq {
            content_type,
            item_schema: item_schema(media, resolver),
        },
        MediaKind::Xml => {
            let (root_name, config) = match &schema {
                Some(s) => {
                    let name = root_name(s, resolver);
                    let config = xml_config(s, &name, resolver);
                    (name, config)
                }
                None => (
                    "root".to_string(),
                    XmlConfig {
                        name: "root".to_string(),
                        ..XmlConfig::default()
                    },
                ),
            };
            BodyVariant::Xml {
                content_type,
                root_name,
                schema,
                config,
            }
        }
        MediaKind::Multipart => BodyVariant::Multipart {
            encoding: multipart_encoding(media, resolver),
            content_type,
            schema,
        },
        MediaKind::UrlEncoded => BodyVariant::Urlencoded {
            encoding: urlencoded_encoding(media),
            content_type,
            schema,
        },
        kind @ (MediaKind::EventStream | MediaKind::Text | MediaKind::Binary) => {
            let binary = kind == MediaKind::Binary
                || schema
                    .as_ref()
                    .and_then(|s| inline_schema(s, resolver))
                    .is_some_and(|s| s.is_binary());
            BodyVariant::Raw {
                content_type,
                schema,
                binary,
            }
        }
    };
    Some(variant)
}

/// `encoded-form-data` from Swagger 2.0 `formData` fields. Multipart when the
/// operation consumes `multipart/form-data` or uploads a file.
pub fn analyze_form_fields(
    fields: &[Parameter],
    consumes: &[String],
    diagnostics: &Diagnostics,
) -> Option<BodyVariant> {
    if fields.is_empty() {
        return None;
    }
    let fields: Vec<FormField> = fields
        .iter()
        .filter_map(|param| {
            let serialization = analyze_parameter(param, diagnostics)?;
            let schema = param.effective_schema();
            let binary = schema
                .as_ref()
                .and_then(SchemaOrRef::as_schema)
                .is_some_and(Schema::is_binary);
            Some(FormField {
                serialization,
                required: param.required,
                binary,
                schema,
            })
        })
        .collect();

    let multipart = fields.iter().any(|f| f.binary)
        || consumes.iter().any(|c| MediaKind::of(c) == MediaKind::Multipart);
    let content_type = if multipart {
        consumes
            .iter()
            .find(|c| MediaKind::of(c) == MediaKind::Multipart)
            .cloned()
            .unwrap_or_else(|| MULTIPART_FORM_DATA.to_string())
    } else {
        FORM_URLENCODED.to_string()
    };
    Some(BodyVariant::EncodedFormData {
        content_type,
        fields,
    })
}

/// Schema of each item of a sequential media type: `itemSchema`, else the
/// `items` of an array schema, else the schema itself.
fn item_schema(media: &MediaType, resolver: Option<&ReferenceResolver<'_>>) -> Option<SchemaOrRef> {
    if let Some(item) = &media.item_schema {
        return Some(item.clone());
    }
    let schema = media.schema.as_ref()?;
    match inline_schema(schema, resolver) {
        Some(s) if s.has_type(&SchemaType::Array) => s.items.map(|items| *items),
        _ => Some(schema.clone()),
    }
}

fn multipart_encoding(
    media: &MediaType,
    resolver: Option<&ReferenceResolver<'_>>,
) -> IndexMap<String, PartEncoding> {
    let properties = media
        .schema
        .as_ref()
        .and_then(|s| inline_schema(s, resolver))
        .map(|s| object_properties(&s, resolver))
        .unwrap_or_default();

    let mut parts = IndexMap::new();
    for (name, prop) in &properties {
        let declared = media.encoding.get(name);
        let content_type = declared
            .and_then(|e| e.content_type.clone())
            .unwrap_or_else(|| {
                let prop = inline_schema(prop, resolver);
                default_part_content_type(prop.as_ref(), resolver).to_string()
            });
        parts.insert(name.clone(), part(declared, Some(content_type)));
    }
    for (name, declared) in &media.encoding {
        if !parts.contains_key(name) {
            let content_type = declared.content_type.clone().or_else(|| Some("text/plain".into()));
            parts.insert(name.clone(), part(Some(declared), content_type));
        }
    }
    parts
}

fn urlencoded_encoding(media: &MediaType) -> IndexMap<String, PartEncoding> {
    media
        .encoding
        .iter()
        .map(|(name, declared)| (name.clone(), part(Some(declared), declared.content_type.clone())))
        .collect()
}

fn part(declared: Option<&Encoding>, content_type: Option<String>) -> PartEncoding {
    let style = declared
        .and_then(|e| e.style.as_deref())
        .and_then(ParamStyle::parse)
        .unwrap_or(ParamStyle::Form);
    PartEncoding {
        content_type,
        headers: declared
            .map(|e| e.headers.keys().cloned().collect())
            .unwrap_or_default(),
        explode: declared
            .and_then(|e| e.explode)
            .unwrap_or_else(|| style.default_explode()),
        allow_reserved: declared.and_then(|e| e.allow_reserved).unwrap_or(false),
        style,
    }
}

/// Part content type when the encoding object does not declare one.
fn default_part_content_type(
    prop: Option<&Schema>,
    resolver: Option<&ReferenceResolver<'_>>,
) -> &'static str {
    let Some(prop) = prop else {
        return "application/octet-stream";
    };
    if prop.is_binary() {
        return "application/octet-stream";
    }
    if prop.has_type(&SchemaType::Array) {
        // Arrays encode per item.
        let item = prop.items.as_deref().and_then(|i| inline_schema(i, resolver));
        return match item {
            Some(item) if item.has_type(&SchemaType::Array) => "application/json",
            Some(item) => default_part_content_type(Some(&item), resolver),
            None => "application/json",
        };
    }
    if prop.has_type(&SchemaType::Object) || !prop.properties.is_empty() {
        return "application/json";
    }
    if prop.schema_type.is_none() && prop.format.is_none() {
        return "application/octet-stream";
    }
    "text/plain"
}

fn object_properties(
    schema: &Schema,
    resolver: Option<&ReferenceResolver<'_>>,
) -> IndexMap<String, SchemaOrRef> {
    let mut merged = IndexMap::new();
    for part in &schema.all_of {
        if let Some(part) = inline_schema(part, resolver) {
            merged.extend(object_properties(&part, resolver));
        }
    }
    merged.extend(schema.properties.clone());
    merged
}
