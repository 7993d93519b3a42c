//! Integration tests for model loading and the client facade

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

use schema_compare::config::{Config, LoaderConfig};
use schema_compare::loader::file::{load_file, parse_model};
use schema_compare::loader::{spawn_load, CatalogLoader, FileLoader, ModelDescriptor, ModelFormat, ModelLoader};
use schema_compare::model::AttributeValue;
use schema_compare::{CompareClient, Error, LoadError, ObjectId, ObjectKind, SchemaObject, Status};

const LEFT_JSON: &str = r#"{
    "id": "model",
    "name": "Sales",
    "kind": "model",
    "children": [
        {
            "id": "e1",
            "name": "Customer",
            "kind": "entity",
            "children": [
                { "id": "a1", "name": "Email", "kind": "attribute",
                  "attributes": { "data_type": "VARCHAR(100)", "nullable": true } }
            ]
        }
    ]
}"#;

const RIGHT_JSON: &str = r#"{
    "id": "model",
    "name": "Sales",
    "kind": "model",
    "children": [
        {
            "id": "e1",
            "name": "Customer",
            "kind": "entity",
            "children": [
                { "id": "a1", "name": "Email", "kind": "attribute",
                  "attributes": { "data_type": "VARCHAR(255)", "nullable": true } }
            ]
        }
    ]
}"#;

const MODEL_YAML: &str = r#"
id: model
name: Sales
kind: model
children:
  - id: e1
    name: Customer
    kind: entity
    attributes:
      comment: people we sell to
"#;

const MODEL_TOML: &str = r#"
id = "model"
name = "Sales"
kind = "model"

[[children]]
id = "e1"
name = "Customer"
kind = "entity"

[children.attributes]
comment = "people we sell to"
"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Loader that never finishes on its own
struct StalledLoader;

#[async_trait]
impl ModelLoader for StalledLoader {
    async fn load_model(&self, _descriptor: &ModelDescriptor) -> Result<SchemaObject, LoadError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(LoadError::NotFound("never".to_string()))
    }
}

/// Loader that answers catalog entries after a per-entry delay
struct DelayedLoader;

#[async_trait]
impl ModelLoader for DelayedLoader {
    async fn load_model(&self, descriptor: &ModelDescriptor) -> Result<SchemaObject, LoadError> {
        match descriptor {
            ModelDescriptor::Catalog(entry) => {
                if entry == "slow" {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                Ok(SchemaObject::new("model", entry, ObjectKind::Model))
            }
            other => Err(LoadError::Unsupported(other.to_string())),
        }
    }
}

#[tokio::test]
async fn test_load_json_file() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "left.json", LEFT_JSON);

    let model = load_file(&path).await.unwrap();

    assert_eq!(model.kind, ObjectKind::Model);
    assert_eq!(model.children[0].children[0].name, "Email");
    assert_eq!(
        model.children[0].children[0].attribute("nullable"),
        Some(&AttributeValue::Bool(true))
    );
}

#[tokio::test]
async fn test_yaml_and_toml_models_agree() {
    let dir = tempdir().unwrap();
    let yaml = load_file(&write(dir.path(), "model.yml", MODEL_YAML)).await.unwrap();
    let toml = load_file(&write(dir.path(), "model.toml", MODEL_TOML)).await.unwrap();

    assert_eq!(yaml, toml);
    assert_eq!(
        yaml.children[0].attribute("comment"),
        Some(&AttributeValue::from("people we sell to"))
    );
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_file(&dir.path().join("absent.json")).await.unwrap_err();

    assert!(matches!(err, LoadError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_extension_names_the_path() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "model.xml", "<model/>");

    match load_file(&path).await.unwrap_err() {
        LoadError::Unsupported(message) => assert!(message.contains("model.xml")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_parse_failure_names_the_source() {
    let err = parse_model("{ not json", ModelFormat::Json, "broken.json").unwrap_err();

    match err {
        LoadError::ParseFailure { source_name, .. } => assert_eq!(source_name, "broken.json"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_file_loader_rejects_other_sources() {
    let err = FileLoader::new()
        .load_model(&ModelDescriptor::Catalog("sales".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Unsupported(_)));
}

#[tokio::test]
async fn test_catalog_lookup_prefers_shallowest_entry() {
    let dir = tempdir().unwrap();
    write(dir.path(), "archive/sales.json", RIGHT_JSON);
    write(dir.path(), "sales.json", LEFT_JSON);
    write(dir.path(), "notes.txt", "not a model");

    let loader = CatalogLoader::new(dir.path());
    assert_eq!(loader.locate("sales").unwrap(), dir.path().join("sales.json"));

    let model = loader
        .load_model(&ModelDescriptor::Catalog("sales".to_string()))
        .await
        .unwrap();
    assert_eq!(
        model.children[0].children[0].attribute("data_type"),
        Some(&AttributeValue::from("VARCHAR(100)"))
    );

    let err = loader.locate("notes").unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
}

#[tokio::test]
async fn test_spawned_load_surfaces_loader_errors() {
    let dir = tempdir().unwrap();
    let handle = spawn_load(
        Arc::new(FileLoader::new()),
        ModelDescriptor::File(dir.path().join("absent.json")),
        None,
    );

    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, Error::Load(LoadError::NotFound(_))));
}

#[tokio::test]
async fn test_cancelled_load_never_yields_a_tree() {
    let handle = spawn_load(
        Arc::new(StalledLoader),
        ModelDescriptor::Catalog("sales".to_string()),
        None,
    );

    handle.cancel();
    assert!(handle.is_cancelled());

    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_load_timeout_is_caller_policy() {
    let limit = Duration::from_millis(50);
    let handle = spawn_load(
        Arc::new(StalledLoader),
        ModelDescriptor::Catalog("sales".to_string()),
        Some(limit),
    );

    let err = handle.wait().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == limit));
}

#[tokio::test]
async fn test_client_compares_models_from_files() {
    let dir = tempdir().unwrap();
    let left = write(dir.path(), "left.json", LEFT_JSON);
    let right = write(dir.path(), "right.json", RIGHT_JSON);

    let client = CompareClient::new(Config::default());
    let result = client
        .compare_models(ModelDescriptor::File(left), ModelDescriptor::File(right))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.status, Status::Different);
    let email = result.find(&ObjectId::from("a1")).unwrap();
    assert_eq!(email.status, Status::Different);
    assert_eq!(result.summary().changed(), 3);
}

#[tokio::test]
async fn test_client_uses_catalog_root() {
    let dir = tempdir().unwrap();
    write(dir.path(), "models/left.json", LEFT_JSON);
    write(dir.path(), "models/right.json", RIGHT_JSON);

    let config = Config {
        loader: LoaderConfig {
            catalog_root: Some(dir.path().to_string_lossy().into_owned()),
            timeout_seconds: Some(10),
        },
        ..Config::default()
    };
    let client = CompareClient::new(config);

    let (left, right) = client
        .load_pair(
            Some(ModelDescriptor::Catalog("left".to_string())),
            None,
        )
        .await
        .unwrap();
    assert!(left.is_some());
    assert!(right.is_none());

    let result = client
        .compare_models(
            ModelDescriptor::Catalog("left".to_string()),
            ModelDescriptor::Catalog("right".to_string()),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.conflict_ids(), Vec::<ObjectId>::new());
}

#[tokio::test]
async fn test_superseded_comparison_yields_nothing() {
    let client = CompareClient::with_loader(Config::default(), Arc::new(DelayedLoader));

    let stale = client.compare_models(
        ModelDescriptor::Catalog("slow".to_string()),
        ModelDescriptor::Catalog("slow".to_string()),
    );
    let fresh = client.compare_models(
        ModelDescriptor::Catalog("fast".to_string()),
        ModelDescriptor::Catalog("fast".to_string()),
    );

    let (stale, fresh) = tokio::join!(stale, fresh);

    assert!(stale.unwrap().is_none());
    let fresh = fresh.unwrap().unwrap();
    assert_eq!(fresh.name, "fast");
    assert_eq!(fresh.status, Status::Equal);
}
