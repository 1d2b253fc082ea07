//! Tests for manifest loading

use std::path::PathBuf;

use tempfile::TempDir;

use purgetree::application::{ApplicationError, Manifest};
use purgetree::domain::Node;
use purgetree::infrastructure::manifest::load_manifest;
use purgetree::infrastructure::InfraError;

fn create_manifest(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("batch.toml");
    std::fs::write(&path, content).expect("write manifest");
    path
}

#[test]
fn given_manifest_file_when_loading_then_builds_tree_with_manifest_root() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_manifest(
        &temp,
        r#"
root = "bin"

[[object]]
id = "page"
parents = ["book"]

[[object]]
id = "book"
parents = ["bin"]
"#,
    );

    // Act
    let mut tree = load_manifest(&path)
        .unwrap()
        .into_tree("trashcan")
        .unwrap();
    tree.reconcile().unwrap();

    // Assert
    assert_eq!(tree.root_id(), "bin");
    assert_eq!(tree.len(), 2);
    assert!(tree.orphans().is_empty());
    assert_eq!(tree.next_leaf().map(Node::id), Some("page"));
}

#[test]
fn given_manifest_without_root_when_building_then_uses_default_root() {
    let manifest = Manifest::parse("[[object]]\nid = \"a\"\nparents = [\"trashcan\"]\n").unwrap();

    let tree = manifest.into_tree("trashcan").unwrap();

    assert_eq!(tree.root_nodes().len(), 1);
}

#[test]
fn given_object_without_parents_when_parsing_then_parents_default_to_empty() {
    let manifest = Manifest::parse("[[object]]\nid = \"a\"\n").unwrap();

    assert!(manifest.objects[0].parents.is_empty());
}

#[test]
fn given_duplicate_ids_when_building_tree_then_domain_error() {
    let manifest = Manifest::parse(
        "[[object]]\nid = \"a\"\nparents = [\"trashcan\"]\n[[object]]\nid = \"a\"\n",
    )
    .unwrap();

    let err = manifest.into_tree("trashcan").unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(_)));
    assert_eq!(err.to_string(), "duplicate node: a");
}

#[test]
fn given_missing_file_when_loading_then_io_error() {
    let temp = TempDir::new().unwrap();

    let err = load_manifest(&temp.path().join("nope.toml")).unwrap_err();

    assert!(matches!(err, InfraError::Io { .. }));
}

#[test]
fn given_malformed_toml_when_loading_then_manifest_error() {
    let temp = TempDir::new().unwrap();
    let path = create_manifest(&temp, "[[object]\nid = ");

    let err = load_manifest(&path).unwrap_err();

    assert!(matches!(
        err,
        InfraError::Application(ApplicationError::Manifest { .. })
    ));
}
