//! Arena-backed deletion tree.
//!
//! Owns every [`Node`] of one deletion batch in a generational arena and keeps
//! an id index on top. Nodes may arrive in any order; edges to parents that are
//! not registered yet are retried by [`Tree::reconcile`].

use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::Node;

/// Working structure for one deletion batch.
#[derive(Debug, Clone)]
pub struct Tree {
    /// Sentinel id of the container; never a tracked node
    root_id: String,
    /// Arena storage for all nodes of the batch
    arena: Arena<Node>,
    /// Id lookup into the arena
    index: HashMap<String, Index>,
    /// Nodes declaring the sentinel as a parent, in registration order
    root_nodes: Vec<Index>,
    /// Nodes still missing a declared parent as of the last reconcile
    orphans: Vec<Index>,
}

impl Tree {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            arena: Arena::new(),
            index: HashMap::new(),
            root_nodes: Vec::new(),
            orphans: Vec::new(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).and_then(|idx| self.arena.get(*idx))
    }

    /// All registered nodes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.arena.iter().map(|(_, node)| node)
    }

    pub fn root_nodes(&self) -> Vec<&Node> {
        self.resolve(&self.root_nodes)
    }

    /// Orphans as of the last [`register`](Self::register) or
    /// [`reconcile`](Self::reconcile). Reading never relinks anything.
    pub fn orphans(&self) -> Vec<&Node> {
        self.resolve(&self.orphans)
    }

    /// Children of `node`, in registration order.
    pub fn children_of<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> {
        node.children()
            .iter()
            .filter_map(|child| self.arena.get(child.index))
    }

    /// Hand a node over to the tree.
    ///
    /// Links the node to every declared parent that is already registered and
    /// marks it as orphan if any non-root parent is still missing.
    #[instrument(level = "debug", skip(self, node), fields(id = %node.id()))]
    pub fn register(&mut self, mut node: Node) -> DomainResult<()> {
        if node.id() == self.root_id {
            return Err(DomainError::ReservedId(node.id().to_string()));
        }
        if self.index.contains_key(node.id()) {
            return Err(DomainError::DuplicateNode(node.id().to_string()));
        }
        if node.requires_parent(node.id()) {
            return Err(DomainError::CycleDetected {
                parent: node.id().to_string(),
                child: node.id().to_string(),
            });
        }

        if node.clear_links() {
            debug!("dropped links from a previous tree");
        }

        let id = node.id().to_string();
        let is_root = node.requires_parent(&self.root_id);
        let parent_ids = node.required_parent_ids().to_vec();

        let idx = self.arena.insert(node);
        self.index.insert(id.clone(), idx);
        if is_root {
            debug!("root node");
            self.root_nodes.push(idx);
        }

        for parent_id in &parent_ids {
            if let Some(&parent_idx) = self.index.get(parent_id) {
                self.link(idx, parent_idx)?;
            }
        }

        if !self.is_resolved(idx) {
            debug!("orphan, missing parents");
            self.orphans.push(idx);
        }
        Ok(())
    }

    /// Register a batch, preserving its order. Stops at the first failure.
    pub fn register_all<I>(&mut self, nodes: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = Node>,
    {
        for node in nodes {
            self.register(node)?;
        }
        Ok(())
    }

    /// Retry parent linkage for every orphan.
    ///
    /// A node stays orphaned only while one of its non-root parents is still
    /// unregistered. Calling this repeatedly is harmless.
    #[instrument(level = "debug", skip(self))]
    pub fn reconcile(&mut self) -> DomainResult<()> {
        let pending = std::mem::take(&mut self.orphans);
        let mut remaining = Vec::with_capacity(pending.len());
        let mut outcome = Ok(());

        for idx in pending {
            if outcome.is_ok() {
                for parent_idx in self.registered_missing_parents(idx) {
                    if let Err(e) = self.link(idx, parent_idx) {
                        outcome = Err(e);
                        break;
                    }
                }
            }
            if !self.is_resolved(idx) {
                remaining.push(idx);
            }
        }

        debug!(orphans = remaining.len(), "reconciled");
        self.orphans = remaining;
        outcome
    }

    /// Next node that is safe to delete: the first leaf below the first root
    /// node, or `None` once no root nodes remain.
    pub fn next_leaf(&self) -> Option<&Node> {
        self.root_nodes
            .first()
            .and_then(|idx| self.arena.get(*idx))
            .map(|root| root.first_leaf(&self.arena))
    }

    /// Forget a node whose external deletion has completed.
    ///
    /// Only leaves can be removed; the check runs before anything is touched.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_leaf(&mut self, id: &str) -> DomainResult<Node> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))?;
        let node = self
            .arena
            .get(idx)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))?;
        if !node.is_leaf() {
            return Err(DomainError::NotALeaf(id.to_string()));
        }

        let parents: Vec<Index> = node.resolved_parents().map(|(_, p)| p).collect();
        for parent_idx in parents {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.remove_child_by_id(id);
            }
        }

        self.orphans.retain(|i| *i != idx);
        self.root_nodes.retain(|i| *i != idx);
        self.index.remove(id);
        let removed = self
            .arena
            .remove(idx)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))?;
        trace!(remaining = self.index.len(), "removed");
        Ok(removed)
    }

    /// Full removal order, computed on a copy so `self` stays untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn deletion_order(&self) -> DomainResult<Vec<String>> {
        let mut scratch = self.clone();
        let mut order = Vec::with_capacity(scratch.len());
        while let Some(leaf) = scratch.next_leaf() {
            let id = leaf.id().to_string();
            scratch.remove_leaf(&id)?;
            order.push(id);
        }
        Ok(order)
    }

    /// Resolved nodes that no root node leads to, sorted by id.
    ///
    /// The driver loop only walks down from root nodes, so these would be
    /// left behind.
    pub fn unreachable(&self) -> Vec<&Node> {
        let mut seen: HashSet<Index> = HashSet::new();
        let mut stack: Vec<Index> = self.root_nodes.clone();
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children().iter().map(|c| c.index));
            }
        }

        let mut nodes: Vec<&Node> = self
            .arena
            .iter()
            .filter(|(idx, _)| !seen.contains(idx) && !self.orphans.contains(idx))
            .map(|(_, node)| node)
            .collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }

    /// Link `child` under `parent`, refusing edges that would close a cycle.
    fn link(&mut self, child: Index, parent: Index) -> DomainResult<()> {
        if child == parent || self.is_descendant(child, parent) {
            return Err(DomainError::CycleDetected {
                parent: self.id_of(parent),
                child: self.id_of(child),
            });
        }
        trace!(child = %self.id_of(child), parent = %self.id_of(parent), "link");
        match self.arena.get2_mut(child, parent) {
            (Some(child_node), Some(parent_node)) => {
                child_node.link_parent(child, parent_node, parent)
            }
            (None, _) => Err(DomainError::UnknownNode(self.id_of(child))),
            (_, None) => Err(DomainError::UnknownNode(self.id_of(parent))),
        }
    }

    /// True if `target` can be reached from `ancestor` through child edges.
    fn is_descendant(&self, ancestor: Index, target: Index) -> bool {
        let mut seen: HashSet<Index> = HashSet::new();
        let mut stack = vec![ancestor];
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            if let Some(node) = self.arena.get(idx) {
                for child in node.children() {
                    if child.index == target {
                        return true;
                    }
                    stack.push(child.index);
                }
            }
        }
        false
    }

    fn registered_missing_parents(&self, idx: Index) -> Vec<Index> {
        self.arena
            .get(idx)
            .map(|node| {
                node.missing_parent_ids()
                    .into_iter()
                    .filter(|id| *id != self.root_id)
                    .filter_map(|id| self.index.get(id).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_resolved(&self, idx: Index) -> bool {
        self.arena
            .get(idx)
            .is_some_and(|node| node.is_resolved(&self.root_id))
    }

    /// Id behind a handle; a stale handle is named by its slot.
    fn id_of(&self, idx: Index) -> String {
        self.arena
            .get(idx)
            .map(|node| node.id().to_string())
            .unwrap_or_else(|| format!("{idx:?}"))
    }

    fn resolve(&self, indices: &[Index]) -> Vec<&Node> {
        indices
            .iter()
            .filter_map(|idx| self.arena.get(*idx))
            .collect()
    }
}
