use percent_encoding::percent_decode_str;

/// Decodes a JSON Pointer segment: percent-decoding first, then `~1` → `/`
/// and `~0` → `~`.
pub fn decode_pointer_segment(segment: &str) -> String {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    decoded.replace("~1", "/").replace("~0", "~")
}

/// Escapes a key for use as a JSON Pointer segment.
pub fn encode_pointer_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Decoded tokens of a fragment pointer such as `/components/schemas/Pet`.
///
/// The empty pointer addresses the whole document; `/` alone addresses the
/// key `""`.
pub fn pointer_tokens(pointer: &str) -> Vec<String> {
    let trimmed = pointer.strip_prefix('#').unwrap_or(pointer);
    match trimmed.strip_prefix('/') {
        Some(rest) => rest.split('/').map(decode_pointer_segment).collect(),
        None if trimmed.is_empty() => Vec::new(),
        None => trimmed.split('/').map(decode_pointer_segment).collect(),
    }
}

/// Walk `root` one token at a time. On failure, returns the first token that
/// could not be followed.
pub fn walk<'v>(
    root: &'v serde_json::Value,
    tokens: &[String],
) -> Result<&'v serde_json::Value, String> {
    let mut current = root;
    for token in tokens {
        let next = match current {
            serde_json::Value::Object(map) => map.get(token.as_str()),
            serde_json::Value::Array(items) => {
                token.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            _ => None,
        };
        current = next.ok_or_else(|| token.clone())?;
    }
    Ok(current)
}
