use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::config::{NamingConfig, NamingStrategy};
use crate::ir::{HttpMethod, NormalizedName, PathInfo};

/// Plural endings that drop `es` rather than `s`.
const ES_PLURALS: [&str; 5] = ["ses", "xes", "zes", "ches", "shes"];

/// Casing variants of a tag, path segment or schema name. Runs of characters
/// that cannot appear in an identifier separate words.
pub fn normalize_name(name: &str) -> NormalizedName {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let joined = if words.is_empty() {
        "unnamed".to_string()
    } else {
        words.join("_")
    };

    NormalizedName {
        original: name.to_string(),
        pascal_case: joined.to_pascal_case(),
        camel_case: joined.to_lower_camel_case(),
        snake_case: joined.to_snake_case(),
        screaming_snake: joined.to_shouty_snake_case(),
    }
}

/// Method name for an operation under the naming strategy, after aliases.
///
/// Aliases are looked up by the derived name first, then by `operationId`.
pub fn method_name(info: &PathInfo, naming: &NamingConfig) -> String {
    let derived = match (naming.strategy, &info.operation_id) {
        (NamingStrategy::UseOperationId, Some(id)) => id.to_lower_camel_case(),
        _ => route_to_name(&info.method, &info.path),
    };
    let by_operation_id = info
        .operation_id
        .as_ref()
        .and_then(|id| naming.aliases.get(id));
    naming
        .aliases
        .get(&derived)
        .or(by_operation_id)
        .cloned()
        .unwrap_or(derived)
}

/// camelCase operation name from the verb and the path's resource segments.
///
/// - `GET /users` → `listUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `POST /users/{userId}/messages` → `createUsersMessages`
/// - `QUERY /search` → `querySearch`
pub fn route_to_name(method: &HttpMethod, path: &str) -> String {
    let single = path_ends_with_param(path);
    let verb = match method {
        HttpMethod::Get if single => "get".to_string(),
        HttpMethod::Get => "list".to_string(),
        HttpMethod::Post => "create".to_string(),
        HttpMethod::Put => "update".to_string(),
        other => other.as_str().to_lower_camel_case(),
    };

    let segments = resource_segments(path);
    let last = segments.len().saturating_sub(1);
    let resource: String = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if single && i == last {
                singular(segment).to_pascal_case()
            } else {
                segment.to_pascal_case()
            }
        })
        .collect();
    format!("{verb}{resource}")
}

/// Non-parameter segments of a path template.
pub fn resource_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && !is_template_segment(s))
        .collect()
}

/// Whether the last segment of a path template is a `{param}`.
pub fn path_ends_with_param(path: &str) -> bool {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .is_some_and(is_template_segment)
}

/// Schema name derived from a reference's file name:
/// `./models/pet-owner.yaml?v=2#/x` becomes `PetOwner`.
pub fn schema_name_from_uri(target: &str) -> String {
    let without_fragment = target.split('#').next().unwrap_or(target);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let file = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(without_query);
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    normalize_name(stem).pascal_case
}

fn is_template_segment(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// English singular of a collection segment, good enough for REST paths.
fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies").filter(|s| !s.is_empty()) {
        return format!("{stem}y");
    }
    if ES_PLURALS.iter().any(|plural| word.ends_with(plural)) {
        return word[..word.len() - 2].to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(method: HttpMethod, path: &str, operation_id: Option<&str>) -> PathInfo {
        let mut info = PathInfo::new(method, path);
        info.operation_id = operation_id.map(str::to_string);
        info
    }

    #[test]
    fn test_tags_and_segments_normalize() {
        let tag = normalize_name("pet store");
        assert_eq!(tag.pascal_case, "PetStore");
        assert_eq!(tag.snake_case, "pet_store");
        assert_eq!(tag.screaming_snake, "PET_STORE");

        let versioned = normalize_name("v2.orders-archive");
        assert_eq!(versioned.camel_case, "v2OrdersArchive");
        assert_eq!(versioned.original, "v2.orders-archive");
    }

    #[test]
    fn test_name_without_identifier_characters() {
        assert_eq!(normalize_name("/").pascal_case, "Unnamed");
        assert_eq!(normalize_name("").snake_case, "unnamed");
    }

    #[test]
    fn test_operation_id_strategy() {
        let naming = NamingConfig::default();
        let named = op(HttpMethod::Get, "/pets", Some("ListAllPets"));
        assert_eq!(method_name(&named, &naming), "listAllPets");

        let unnamed = op(HttpMethod::Delete, "/pets/{petId}", None);
        assert_eq!(method_name(&unnamed, &naming), "deletePet");
    }

    #[test]
    fn test_route_strategy_ignores_operation_id() {
        let naming = NamingConfig {
            strategy: NamingStrategy::UseRouteBased,
            ..NamingConfig::default()
        };
        let named = op(HttpMethod::Get, "/pets/{petId}/toys", Some("toysOfPet"));
        assert_eq!(method_name(&named, &naming), "listPetsToys");
    }

    #[test]
    fn test_aliases_by_derived_name_then_operation_id() {
        let mut naming = NamingConfig::default();
        naming.aliases.insert("getPet".into(), "fetch".into());
        naming.aliases.insert("showPetById".into(), "show".into());

        let by_derived = op(HttpMethod::Get, "/pets/{id}", Some("getPet"));
        assert_eq!(method_name(&by_derived, &naming), "fetch");

        let by_id = op(HttpMethod::Get, "/pets/{id}", Some("showPetById"));
        assert_eq!(method_name(&by_id, &naming), "show");
    }

    #[test]
    fn test_route_names_by_verb() {
        let cases = [
            (HttpMethod::Get, "/users", "listUsers"),
            (HttpMethod::Post, "/users", "createUsers"),
            (HttpMethod::Get, "/users/{userId}", "getUser"),
            (HttpMethod::Put, "/users/{userId}", "updateUser"),
            (HttpMethod::Patch, "/users/{userId}", "patchUser"),
            (HttpMethod::Query, "/search", "querySearch"),
            (HttpMethod::Other("LINK".into()), "/pets/{id}", "linkPet"),
            (HttpMethod::Head, "/", "head"),
        ];
        for (method, path, expected) in cases {
            assert_eq!(route_to_name(&method, path), expected, "{path}");
        }
    }

    #[test]
    fn test_only_trailing_item_is_singular() {
        assert_eq!(
            route_to_name(&HttpMethod::Get, "/categories/{c}/boxes/{b}"),
            "getCategoriesBox"
        );
        assert_eq!(
            route_to_name(&HttpMethod::Get, "/users/{userId}/messages"),
            "listUsersMessages"
        );
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("policies"), "policy");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("branches"), "branch");
        assert_eq!(singular("pets"), "pet");
        assert_eq!(singular("access"), "access");
        assert_eq!(singular("s"), "s");
    }

    #[test]
    fn test_path_shape() {
        assert!(path_ends_with_param("/pets/{id}"));
        assert!(path_ends_with_param("/pets/{id}/"));
        assert!(!path_ends_with_param("/pets/{id}/toys"));
        assert_eq!(resource_segments("/pets/{id}/toys"), vec!["pets", "toys"]);
    }

    #[test]
    fn test_schema_name_from_uri() {
        assert_eq!(schema_name_from_uri("./models/pet-owner.yaml?v=2#/x"), "PetOwner");
        assert_eq!(schema_name_from_uri("https://example.com/schemas/dog.json"), "Dog");
        assert_eq!(schema_name_from_uri("cat"), "Cat");
    }
}
