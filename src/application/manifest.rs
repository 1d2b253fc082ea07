//! Batch manifest: the descriptors of one deletion batch.
//!
//! ```toml
//! root = "trashcan"        # optional, overrides the configured root id
//!
//! [[object]]
//! id = "book:1"
//! parents = ["trashcan"]
//!
//! [[object]]
//! id = "page:1"
//! parents = ["book:1"]
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Node, Tree};

/// One repository object and its direct parents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub id: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl From<ObjectDescriptor> for Node {
    fn from(descriptor: ObjectDescriptor) -> Self {
        Node::new(descriptor.id, descriptor.parents)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Container id; falls back to the configured root id
    #[serde(default)]
    pub root: Option<String>,
    /// Objects in discovery order
    #[serde(default, rename = "object")]
    pub objects: Vec<ObjectDescriptor>,
}

impl Manifest {
    /// Parse and validate manifest content.
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| ApplicationError::Manifest {
            message: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> ApplicationResult<()> {
        if self.root.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(ApplicationError::Manifest {
                message: "root id must not be empty".into(),
            });
        }
        for (pos, object) in self.objects.iter().enumerate() {
            if object.id.trim().is_empty() {
                return Err(ApplicationError::Manifest {
                    message: format!("object #{} has an empty id", pos + 1),
                });
            }
            if object.parents.iter().any(|p| p.trim().is_empty()) {
                return Err(ApplicationError::Manifest {
                    message: format!("object {} has an empty parent id", object.id),
                });
            }
        }
        Ok(())
    }

    /// Root id to use: the manifest's own, else `default_root`.
    pub fn root_id<'a>(&'a self, default_root: &'a str) -> &'a str {
        self.root.as_deref().unwrap_or(default_root)
    }

    /// Register every object, in manifest order, into a fresh tree.
    ///
    /// The tree is not reconciled; that is left to the caller.
    #[instrument(level = "debug", skip(self))]
    pub fn into_tree(self, default_root: &str) -> ApplicationResult<Tree> {
        let mut tree = Tree::new(self.root_id(default_root));
        debug!(objects = self.objects.len(), root = tree.root_id(), "building tree");
        tree.register_all(self.objects.into_iter().map(Node::from))?;
        Ok(tree)
    }
}
