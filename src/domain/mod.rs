//! Domain layer: the deletion tree and its nodes
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod node;
pub mod render;
pub mod tree;

pub use error::{DomainError, DomainResult};
pub use node::{Node, NodeRef};
pub use render::TreeNodeConvert;
pub use tree::Tree;
