use serde::Serialize;

/// Serialization family of a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Json,
    JsonLines,
    JsonSeq,
    EventStream,
    Xml,
    Multipart,
    UrlEncoded,
    Text,
    Binary,
}

impl MediaKind {
    /// Classify a media type string, ignoring parameters and case.
    pub fn of(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or(media_type)
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/json-seq" => MediaKind::JsonSeq,
            "application/jsonl" | "application/x-ndjson" | "application/x-jsonlines"
            | "application/jsonlines" | "application/json-lines" => MediaKind::JsonLines,
            "text/event-stream" => MediaKind::EventStream,
            "application/x-www-form-urlencoded" => MediaKind::UrlEncoded,
            "application/json" => MediaKind::Json,
            "application/xml" | "text/xml" => MediaKind::Xml,
            e if e.ends_with("+json") => MediaKind::Json,
            e if e.ends_with("+xml") => MediaKind::Xml,
            e if e.starts_with("multipart/") => MediaKind::Multipart,
            e if e.starts_with("text/") => MediaKind::Text,
            _ => MediaKind::Binary,
        }
    }

    /// Request body preference; lower wins.
    pub fn body_priority(&self) -> u8 {
        match self {
            MediaKind::Json => 0,
            MediaKind::JsonLines => 1,
            MediaKind::JsonSeq => 2,
            MediaKind::Xml => 3,
            MediaKind::Multipart => 4,
            MediaKind::UrlEncoded => 5,
            MediaKind::EventStream | MediaKind::Text | MediaKind::Binary => 6,
        }
    }
}
