//! Tests for PurgeService

use std::io;
use std::sync::{Arc, Mutex};

use purgetree::application::services::PurgeService;
use purgetree::application::ApplicationError;
use purgetree::domain::{Node, Tree};
use purgetree::infrastructure::traits::ObjectRemover;
use purgetree::util::testing;

const ROOT: &str = "trashcan";

/// Records every id it is asked to remove; fails on `fail_on`.
#[derive(Default)]
struct RecordingRemover {
    removed: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingRemover {
    fn failing_on(id: &str) -> Self {
        Self {
            fail_on: Some(id.to_string()),
            ..Self::default()
        }
    }

    fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl ObjectRemover for RecordingRemover {
    fn remove(&self, id: &str) -> io::Result<()> {
        if self.fail_on.as_deref() == Some(id) {
            return Err(io::Error::other("backend said no"));
        }
        self.removed.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

fn batch() -> Tree {
    // deliberately out of order
    let mut tree = Tree::new(ROOT);
    tree.register_all([
        Node::new("page:2", ["book"]),
        Node::new("page:1", ["book"]),
        Node::new("book", ["collection"]),
        Node::new("collection", [ROOT]),
    ])
    .unwrap();
    tree
}

#[test]
fn given_unordered_batch_when_purging_then_removes_leaf_first() {
    testing::init_test_setup();
    // Arrange
    let remover = Arc::new(RecordingRemover::default());
    let service = PurgeService::new(remover.clone());
    let mut tree = batch();

    // Act
    let report = service.purge(&mut tree, None).unwrap();

    // Assert
    assert_eq!(remover.removed(), ["page:2", "page:1", "book", "collection"]);
    assert_eq!(report.removed, remover.removed());
    assert!(report.is_complete());
    assert!(tree.is_empty());
    assert!(report.finished_at >= report.started_at);
}

#[test]
fn given_limit_when_purging_then_stops_early_and_tree_is_resumable() {
    testing::init_test_setup();
    let remover = Arc::new(RecordingRemover::default());
    let service = PurgeService::new(remover.clone());
    let mut tree = batch();

    let first = service.purge(&mut tree, Some(3)).unwrap();

    assert_eq!(first.removed, ["page:2", "page:1", "book"]);
    assert_eq!(first.remaining, 1);
    assert!(!first.is_complete());

    let second = service.purge(&mut tree, None).unwrap();
    assert_eq!(second.removed, ["collection"]);
    assert!(second.is_complete());
}

#[test]
fn given_failing_remover_when_purging_then_aborts_and_keeps_failed_node() {
    testing::init_test_setup();
    let remover = Arc::new(RecordingRemover::failing_on("book"));
    let service = PurgeService::new(remover.clone());
    let mut tree = batch();

    let err = service.purge(&mut tree, None).unwrap_err();

    match err {
        ApplicationError::RemovalFailed { id, removed, .. } => {
            assert_eq!(id, "book");
            assert_eq!(removed, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(remover.removed(), ["page:2", "page:1"]);
    assert!(tree.contains("book"));
    assert_eq!(tree.next_leaf().map(Node::id), Some("book"));
}

#[test]
fn given_missing_ancestor_when_purging_then_nothing_is_removed() {
    testing::init_test_setup();
    let remover = Arc::new(RecordingRemover::default());
    let service = PurgeService::new(remover.clone());
    let mut tree = Tree::new(ROOT);
    tree.register_all([
        Node::new("page", ["book"]),
        Node::new("collection", [ROOT]),
    ])
    .unwrap();

    let err = service.purge(&mut tree, None).unwrap_err();

    assert!(matches!(err, ApplicationError::IncompleteBatch { ref orphans } if orphans[0].id == "page"));
    assert!(remover.removed().is_empty());
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_subtree_without_root_when_preflight_then_unreachable() {
    testing::init_test_setup();
    let service = PurgeService::new(Arc::new(RecordingRemover::default()));
    let mut tree = Tree::new(ROOT);
    tree.register_all([
        Node::new("collection", [ROOT]),
        Node::new("detached", Vec::<String>::new()),
        Node::new("below", ["detached"]),
    ])
    .unwrap();

    let err = service.preflight(&mut tree).unwrap_err();

    match err {
        ApplicationError::Unreachable { ids } => assert_eq!(ids, ["below", "detached"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn given_cyclic_batch_when_preflight_then_domain_error() {
    testing::init_test_setup();
    let service = PurgeService::new(Arc::new(RecordingRemover::default()));
    let mut tree = Tree::new(ROOT);
    tree.register_all([Node::new("a", [ROOT, "b"]), Node::new("b", ["a"])])
        .unwrap();

    let err = service.preflight(&mut tree).unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(_)));
}

#[test]
fn given_empty_batch_when_purging_then_empty_report() {
    let service = PurgeService::new(Arc::new(RecordingRemover::default()));
    let mut tree = Tree::new(ROOT);

    let report = service.purge(&mut tree, None).unwrap();

    assert!(report.removed.is_empty());
    assert!(report.is_complete());
}
