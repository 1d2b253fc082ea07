//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors signal a violated graph invariant.
///
/// None of them are expected at runtime: each one means either the batch data
/// or the driver loop is wrong, and the batch should be aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unrecognized node provided.")]
    UnknownNode(String),

    #[error("{0} is not a leaf node!")]
    NotALeaf(String),

    #[error("child does not recognize parent")]
    BrokenLinkage { parent: String, child: String },

    #[error("unexpected parent id: {0}")]
    UnexpectedParent(String),

    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    #[error("node id is reserved for the root container: {0}")]
    ReservedId(String),

    #[error("cycle detected linking {child} under {parent}")]
    CycleDetected { parent: String, child: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
