use serde::Serialize;

use super::decode::needs_auto_decode;
use super::media::MediaKind;
use crate::ir::PathInfo;
use crate::parse::schema::SchemaOrRef;
use crate::resolve::ReferenceResolver;

/// How a response payload is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseKind {
    Json,
    JsonLines,
    JsonSeq,
    EventStream,
    Xml,
    Text,
    Binary,
    Empty,
}

impl ResponseKind {
    fn of(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Json => ResponseKind::Json,
            MediaKind::JsonLines => ResponseKind::JsonLines,
            MediaKind::JsonSeq => ResponseKind::JsonSeq,
            MediaKind::EventStream => ResponseKind::EventStream,
            MediaKind::Xml => ResponseKind::Xml,
            MediaKind::Text | MediaKind::UrlEncoded => ResponseKind::Text,
            MediaKind::Multipart | MediaKind::Binary => ResponseKind::Binary,
        }
    }
}

/// One (status, media type) pair of an operation's responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseVariant {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
    pub auto_decode: bool,
}

impl ResponseVariant {
    pub fn is_success(&self) -> bool {
        self.status.starts_with('2')
    }
}

/// Response variants in declaration order. A response without content
/// yields one `empty` variant.
pub fn analyze_responses(
    info: &PathInfo,
    resolver: Option<&ReferenceResolver<'_>>,
    auto_decode_depth: usize,
) -> Vec<ResponseVariant> {
    let mut variants = Vec::new();
    for (status, response) in &info.responses {
        if response.content.is_empty() {
            variants.push(ResponseVariant {
                status: status.clone(),
                content_type: None,
                kind: ResponseKind::Empty,
                schema: None,
                auto_decode: false,
            });
            continue;
        }
        for (content_type, media) in &response.content {
            let schema = media.item_schema.clone().or_else(|| media.schema.clone());
            let auto_decode = schema
                .as_ref()
                .is_some_and(|s| needs_auto_decode(s, resolver, auto_decode_depth));
            variants.push(ResponseVariant {
                status: status.clone(),
                content_type: Some(content_type.clone()),
                kind: ResponseKind::of(MediaKind::of(content_type)),
                schema,
                auto_decode,
            });
        }
    }
    variants
}
