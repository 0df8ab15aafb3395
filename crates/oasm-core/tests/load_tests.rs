mod common;

use std::fs;

use common::MemoryFetcher;
use oasm_core::config::{self, EnumStyle, ModelConfig};
use oasm_core::ir::IrSchema;
use oasm_core::{ApiModel, DiagnosticKind, ModelError, SpecLoadError, SpecLoader};
use serde_json::json;

const A_URI: &str = "https://specs.test/a.json";
const B_URI: &str = "https://specs.test/b.json";

fn circular_pair() -> MemoryFetcher {
    let a = json!({
        "openapi": "3.1.0",
        "info": {"title": "Linked", "version": "1"},
        "paths": {},
        "components": {"schemas": {
            "Node": {"$ref": "b.json#/Node"},
            "Leaf": {"type": "string"},
            "Again": {"$ref": "a.json#/components/schemas/Leaf"},
            "Money": {
                "$id": "https://specs.test/schemas/money.json",
                "$anchor": "Money",
                "type": "object",
                "properties": {"amount": {"type": "number"}}
            },
            "Price": {"$ref": "https://specs.test/schemas/money.json"}
        }}
    });
    let b = json!({
        "Node": {
            "type": "object",
            "properties": {
                "next": {"$ref": "a.json#/components/schemas/Node"},
                "child": {"$ref": "#/Node"}
            }
        }
    });
    MemoryFetcher::new()
        .with(A_URI, &a.to_string())
        .with(B_URI, &b.to_string())
}

fn load_err(fetcher: MemoryFetcher, uri: &str) -> ModelError {
    let loader = SpecLoader::with_fetcher(fetcher);
    ApiModel::load_with(&loader, uri, &ModelConfig::default()).expect_err("load should fail")
}

#[test]
fn circular_documents_are_fetched_once() {
    let loader = SpecLoader::with_fetcher(circular_pair());
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();

    let fetcher = loader.fetcher();
    assert_eq!(fetcher.fetch_count(A_URI), 1);
    assert_eq!(fetcher.fetch_count(B_URI), 1);
    // `$id`-addressed schemas come from the index, never the network.
    assert_eq!(fetcher.total_fetches(), 2);

    let node = model.schema_registry().get("Node").expect("Node resolved");
    assert!(node.properties.contains_key("next"));
    assert!(node.properties.contains_key("child"));
    assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics().entries());
}

#[test]
fn anchor_reference_round_trips() {
    let loader = SpecLoader::with_fetcher(circular_pair());
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();

    let by_pointer = model.resolve_reference("#/components/schemas/Money").unwrap();
    let by_anchor = model
        .resolve_reference("https://specs.test/schemas/money.json#Money")
        .unwrap();
    assert_eq!(by_anchor, by_pointer);
    assert!(model.schema_registry().contains("Price"));
}

#[test]
fn resolution_is_idempotent() {
    let loader = SpecLoader::with_fetcher(circular_pair());
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();
    let resolver = model.resolver();

    let reference = json!({"$ref": "#/components/schemas/Again"});
    let once = resolver.resolve(&reference).unwrap();
    assert_eq!(once, json!({"type": "string"}));
    assert_eq!(resolver.resolve(&once), Some(once.clone()));
}

#[test]
fn unreachable_sub_document_is_soft() {
    let entry = json!({
        "openapi": "3.0.3",
        "info": {"title": "Partial", "version": "1"},
        "paths": {},
        "components": {"schemas": {
            "Gone": {"$ref": "missing.json#/Gone"},
            "Kept": {"type": "integer"}
        }}
    });
    let loader = SpecLoader::with_fetcher(MemoryFetcher::new().with(A_URI, &entry.to_string()));
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();

    let unreachable = model
        .diagnostics()
        .of_kind(DiagnosticKind::UnreachableDocument);
    insta::assert_snapshot!(
        unreachable[0].message,
        @"Skipping referenced document: failed to fetch https://specs.test/missing.json: HTTP 404 Not Found"
    );
    assert!(!model.schema_registry().contains("Gone"));
    assert!(model.schema_registry().contains("Kept"));
    assert!(!model
        .diagnostics()
        .of_kind(DiagnosticKind::UnresolvedReference)
        .is_empty());
}

#[test]
fn missing_entry_document_is_an_error() {
    let err = load_err(MemoryFetcher::new(), "https://specs.test/none.json");
    assert!(matches!(err, ModelError::Load(SpecLoadError::Fetch { .. })));
    insta::assert_snapshot!(err.to_string(), @"failed to fetch https://specs.test/none.json: HTTP 404 Not Found");
}

#[test]
fn unparsable_entry_document_is_an_error() {
    let fetcher = MemoryFetcher::new().with(A_URI, "{ not: [valid");
    let err = load_err(fetcher, A_URI);
    assert!(matches!(err, ModelError::Load(SpecLoadError::Parse { .. })));
}

#[test]
fn undefined_server_variable_fails_fast() {
    let spec = json!({
        "openapi": "3.2.0",
        "info": {"title": "Servers", "version": "1"},
        "servers": [{"url": "https://{env}.x.com", "variables": {}}],
        "paths": {}
    });
    let err = load_err(MemoryFetcher::new().with(A_URI, &spec.to_string()), A_URI);
    assert!(matches!(err, ModelError::Load(SpecLoadError::Validation(_))));
    insta::assert_snapshot!(
        err.to_string(),
        @r#"server URL "https://{env}.x.com" uses variable "env" which is not defined in variables"#
    );
}

#[test]
fn duplicate_server_names_fail_fast() {
    let spec = json!({
        "openapi": "3.2.0",
        "info": {"title": "Servers", "version": "1"},
        "servers": [
            {"url": "https://a.x.com", "name": "prod"},
            {"url": "https://b.x.com", "name": "prod"}
        ],
        "paths": {}
    });
    let err = load_err(MemoryFetcher::new().with(A_URI, &spec.to_string()), A_URI);
    insta::assert_snapshot!(err.to_string(), @r#"server name "prod" must be unique"#);
}

#[test]
fn missing_info_fails_fast() {
    let spec = json!({"openapi": "3.0.0", "paths": {}});
    let err = load_err(MemoryFetcher::new().with(A_URI, &spec.to_string()), A_URI);
    insta::assert_snapshot!(err.to_string(), @"missing required field: info");
}

#[test]
fn multi_file_spec_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("models")).unwrap();
    fs::write(
        dir.path().join("openapi.yaml"),
        r##"
openapi: 3.0.3
info:
  title: Files
  version: "1"
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "./models/pet.yaml#/Pet"
components:
  schemas:
    Pet:
      $ref: "./models/pet.yaml#/Pet"
    Owner:
      type: object
      properties:
        name:
          type: string
"##,
    )
    .unwrap();
    fs::write(
        dir.path().join("models/pet.yaml"),
        r##"
Pet:
  type: object
  properties:
    owner:
      $ref: "../openapi.yaml#/components/schemas/Owner"
    tag:
      $ref: "#/Tag"
Tag:
  type: string
"##,
    )
    .unwrap();

    let entry = dir.path().join("openapi.yaml");
    let model = ApiModel::load(entry.to_str().unwrap()).unwrap();

    assert_eq!(model.cache().len(), 2);
    let pet = model.schema_registry().get("Pet").expect("Pet registered");
    assert_eq!(
        pet.properties.keys().collect::<Vec<_>>(),
        vec!["owner", "tag"]
    );
    assert_eq!(
        model.resolve_reference("./models/pet.yaml#/Pet/properties/tag"),
        Some(json!({"type": "string"}))
    );

    let variants = model.response_variants(&model.operations()[0]);
    assert!(variants[0].schema.is_some());
    assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics().entries());
}

#[test]
fn config_file_steers_type_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join(config::CONFIG_FILE_NAME);
    fs::write(&config_path, "options:\n  enum_style: union\n").unwrap();
    let cfg = config::load_config(&config_path).unwrap().unwrap();
    assert_eq!(cfg.options.enum_style, EnumStyle::Union);

    let spec = json!({
        "openapi": "3.1.0",
        "info": {"title": "Colors", "version": "1"},
        "components": {"schemas": {"Color": {"type": "string", "enum": ["red", "blue"]}}}
    });
    let loader = SpecLoader::with_fetcher(MemoryFetcher::new().with(A_URI, &spec.to_string()));
    let model = ApiModel::load_with(&loader, A_URI, &cfg).unwrap();
    assert!(matches!(model.ir_schemas()[0], IrSchema::Alias(_)));
    assert!(model.operations().is_empty());
}

#[test]
fn mapping_targets_sharing_an_external_file_keep_their_names() {
    let entry = json!({
        "openapi": "3.1.0",
        "info": {"title": "Shared", "version": "1"},
        "components": {"schemas": {
            "Pet": {
                "oneOf": [
                    {"$ref": "common.json#/Cat"},
                    {"$ref": "common.json#/Dog"}
                ],
                "discriminator": {
                    "propertyName": "kind",
                    "mapping": {"cat": "common.json#/Cat", "dog": "common.json#/Dog"}
                }
            }
        }}
    });
    let common = json!({
        "Cat": {"type": "object", "properties": {
            "kind": {"const": "cat"},
            "meow": {"type": "string"}
        }},
        "Dog": {"type": "object", "properties": {
            "kind": {"const": "dog"},
            "bark": {"type": "string"}
        }}
    });
    let fetcher = MemoryFetcher::new()
        .with(A_URI, &entry.to_string())
        .with("https://specs.test/common.json", &common.to_string());
    let loader = SpecLoader::with_fetcher(fetcher);
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();

    let pet = model.discriminators().get("Pet").expect("Pet discriminator");
    assert_eq!(pet.mapping.get("cat").map(String::as_str), Some("Cat"));
    assert_eq!(pet.mapping.get("dog").map(String::as_str), Some("Dog"));

    let dog = model.schema_registry().get("Dog").expect("Dog registered");
    assert!(dog.properties.contains_key("bark"));
    assert!(!dog.properties.contains_key("meow"));

    let parent = model.schema_registry().get("Pet").unwrap().clone();
    let options = model.polymorphic_schema_options(&parent);
    let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["cat", "dog"]);
    assert!(options[1].schema.properties.contains_key("bark"));
    assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics().entries());
}

#[test]
fn dynamic_reference_into_another_document() {
    let entry = json!({
        "openapi": "3.1.0",
        "info": {"title": "Trees", "version": "1"},
        "components": {"schemas": {"Tree": {"$dynamicRef": "tree.json#node"}}}
    });
    let tree = json!({
        "Node": {
            "$dynamicAnchor": "node",
            "type": "object",
            "properties": {"label": {"$ref": "#/Label"}}
        },
        "Label": {"type": "string", "maxLength": 20}
    });
    let fetcher = MemoryFetcher::new()
        .with(A_URI, &entry.to_string())
        .with("https://specs.test/tree.json", &tree.to_string());
    let loader = SpecLoader::with_fetcher(fetcher);
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();

    let node = model.resolve_reference("#/components/schemas/Tree").unwrap();
    let label = node["properties"]["label"]["$ref"].as_str().unwrap();
    assert_eq!(label, "https://specs.test/tree.json#/Label");
    assert_eq!(
        model.resolve_reference(label),
        Some(json!({"type": "string", "maxLength": 20}))
    );
    assert!(model.diagnostics().is_empty(), "{:?}", model.diagnostics().entries());
}

#[test]
fn non_string_reference_is_reported() {
    let entry = json!({
        "openapi": "3.1.0",
        "info": {"title": "Odd", "version": "1"},
        "components": {"schemas": {"Broken": {"$ref": 42, "type": "string"}}}
    });
    let loader = SpecLoader::with_fetcher(MemoryFetcher::new().with(A_URI, &entry.to_string()));
    let model = ApiModel::load_with(&loader, A_URI, &ModelConfig::default()).unwrap();

    let unsupported = model
        .diagnostics()
        .of_kind(DiagnosticKind::UnsupportedConstruct);
    insta::assert_snapshot!(
        unsupported[0].message,
        @"Ignoring non-string $ref 42 at https://specs.test/a.json#/components/schemas/Broken/$ref"
    );
}
