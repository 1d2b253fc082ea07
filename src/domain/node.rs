//! Repository object node with parent/child linkage.
//!
//! Nodes never own each other. Every edge is stored as an id plus the
//! arena handle of the node on the other end; the owning arena lives in
//! [`crate::domain::Tree`].

use std::collections::BTreeMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

/// Handle to another node in the same arena, paired with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    pub index: Index,
}

/// One repository object in a deletion batch.
#[derive(Debug, Clone)]
pub struct Node {
    /// Object identifier, immutable
    id: String,
    /// Declared parents in declaration order, without duplicates
    required_parent_ids: Vec<String>,
    /// Parents linked so far, keyed by id
    resolved_parents: BTreeMap<String, Index>,
    /// Children in registration order
    children: Vec<NodeRef>,
}

impl Node {
    pub fn new<I, S>(id: impl Into<String>, required_parent_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parents: Vec<String> = Vec::new();
        for parent in required_parent_ids {
            let parent = parent.into();
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }

        Self {
            id: id.into(),
            required_parent_ids: parents,
            resolved_parents: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn required_parent_ids(&self) -> &[String] {
        &self.required_parent_ids
    }

    pub fn requires_parent(&self, id: &str) -> bool {
        self.required_parent_ids.iter().any(|p| p == id)
    }

    /// Ids of parents that are already linked, sorted.
    pub fn resolved_parent_ids(&self) -> impl Iterator<Item = &str> {
        self.resolved_parents.keys().map(String::as_str)
    }

    pub(crate) fn resolved_parents(&self) -> impl Iterator<Item = (&str, Index)> {
        self.resolved_parents.iter().map(|(id, idx)| (id.as_str(), *idx))
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Declared parents that are not linked yet, in declaration order.
    ///
    /// The root sentinel is never linked, so it shows up here whenever it is
    /// declared; callers that care filter it out.
    pub fn missing_parent_ids(&self) -> Vec<&str> {
        self.required_parent_ids
            .iter()
            .filter(|id| !self.resolved_parents.contains_key(id.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// True when every declared parent other than `root_id` is linked.
    pub fn is_resolved(&self, root_id: &str) -> bool {
        self.missing_parent_ids().iter().all(|id| *id == root_id)
    }

    /// Register `candidate` as a child of this node.
    ///
    /// The candidate must declare this node as a parent. Adding the same child
    /// id twice leaves the children untouched.
    #[instrument(level = "trace", skip(self, candidate), fields(parent = %self.id, child = %candidate.id))]
    pub(crate) fn add_child(&mut self, candidate: &Node, candidate_index: Index) -> DomainResult<()> {
        if !candidate.requires_parent(&self.id) {
            return Err(DomainError::BrokenLinkage {
                parent: self.id.clone(),
                child: candidate.id.clone(),
            });
        }
        if self.children.iter().any(|c| c.id == candidate.id) {
            trace!("child already registered");
            return Ok(());
        }
        self.children.push(NodeRef {
            id: candidate.id.clone(),
            index: candidate_index,
        });
        Ok(())
    }

    /// Register `candidate` as a resolved parent of this node.
    ///
    /// The candidate records this node as its child first; the parent entry
    /// is only written once both sides agree.
    #[instrument(level = "trace", skip(self, candidate), fields(child = %self.id, parent = %candidate.id))]
    pub(crate) fn link_parent(
        &mut self,
        self_index: Index,
        candidate: &mut Node,
        candidate_index: Index,
    ) -> DomainResult<()> {
        if !self.requires_parent(&candidate.id) {
            return Err(DomainError::UnexpectedParent(candidate.id.clone()));
        }
        candidate.add_child(self, self_index)?;
        self.resolved_parents
            .insert(candidate.id.clone(), candidate_index);
        Ok(())
    }

    /// Forget every parent and child edge. Returns whether any existed.
    ///
    /// Handles are only meaningful inside the arena that issued them.
    pub(crate) fn clear_links(&mut self) -> bool {
        let linked = !self.children.is_empty() || !self.resolved_parents.is_empty();
        self.children.clear();
        self.resolved_parents.clear();
        linked
    }

    /// Drop the child edge with the given id. Returns whether one was removed.
    pub fn remove_child_by_id(&mut self, id: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.id != id);
        before != self.children.len()
    }

    /// Follow first-registered children down to a node without children.
    ///
    /// Terminates because the tree refuses edges that would close a cycle.
    pub fn first_leaf<'a>(&'a self, arena: &'a Arena<Node>) -> &'a Node {
        let mut current = self;
        while let Some(next) = current
            .children
            .first()
            .and_then(|child| arena.get(child.index))
        {
            current = next;
        }
        current
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
