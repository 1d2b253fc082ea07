//! Purge service
//!
//! Drives the leaf-first deletion loop over a [`Tree`]: pick the next leaf,
//! destroy it through an [`ObjectRemover`], confirm the removal to the tree.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::application::error::MissingParents;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Tree;
use crate::infrastructure::traits::ObjectRemover;

/// Outcome of a purge run.
#[derive(Debug, Clone)]
pub struct PurgeReport {
    /// Removed ids, in removal order
    pub removed: Vec<String>,
    /// Nodes left in the tree
    pub remaining: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PurgeReport {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// Service for deleting a batch of objects in a safe order.
pub struct PurgeService {
    remover: Arc<dyn ObjectRemover>,
}

impl PurgeService {
    pub fn new(remover: Arc<dyn ObjectRemover>) -> Self {
        Self { remover }
    }

    /// Reconcile the tree and refuse batches the driver loop cannot finish.
    ///
    /// Fails with `IncompleteBatch` while any node still misses a declared
    /// parent, and with `Unreachable` when some node hangs below no root.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn preflight(&self, tree: &mut Tree) -> ApplicationResult<()> {
        tree.reconcile()?;

        let orphans: Vec<MissingParents> = tree
            .orphans()
            .into_iter()
            .map(|node| MissingParents {
                id: node.id().to_string(),
                missing: node
                    .missing_parent_ids()
                    .into_iter()
                    .filter(|id| *id != tree.root_id())
                    .map(String::from)
                    .collect(),
            })
            .collect();
        if !orphans.is_empty() {
            warn!(count = orphans.len(), "batch has orphans");
            return Err(ApplicationError::IncompleteBatch { orphans });
        }

        let unreachable: Vec<String> = tree
            .unreachable()
            .into_iter()
            .map(|node| node.id().to_string())
            .collect();
        if !unreachable.is_empty() {
            warn!(count = unreachable.len(), "batch has unreachable nodes");
            return Err(ApplicationError::Unreachable { ids: unreachable });
        }

        debug!(nodes = tree.len(), roots = tree.root_nodes().len(), "preflight ok");
        Ok(())
    }

    /// Deletion order for the whole batch, without removing anything.
    pub fn plan(&self, tree: &mut Tree) -> ApplicationResult<Vec<String>> {
        self.preflight(tree)?;
        Ok(tree.deletion_order()?)
    }

    /// Remove objects leaf-first until the tree is empty or `limit` objects
    /// have been removed.
    ///
    /// A failing removal stops the run; the failed node stays in the tree,
    /// so the tree remains consistent and the run can be resumed.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn purge(&self, tree: &mut Tree, limit: Option<usize>) -> ApplicationResult<PurgeReport> {
        self.preflight(tree)?;

        let started_at = Utc::now();
        let mut removed = Vec::new();

        while limit.map_or(true, |max| removed.len() < max) {
            let Some(leaf) = tree.next_leaf() else {
                break;
            };
            let id = leaf.id().to_string();

            if let Err(source) = self.remover.remove(&id) {
                warn!(%id, error = %source, "removal failed, aborting batch");
                return Err(ApplicationError::RemovalFailed {
                    id,
                    removed: removed.len(),
                    source,
                });
            }
            tree.remove_leaf(&id)?;
            info!(%id, "removed");
            removed.push(id);
        }

        let report = PurgeReport {
            removed,
            remaining: tree.len(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            removed = report.removed.len(),
            remaining = report.remaining,
            "purge finished"
        );
        Ok(report)
    }
}
