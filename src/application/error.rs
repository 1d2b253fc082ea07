//! Application-level errors (wraps domain errors)

use std::fmt;
use std::io;

use thiserror::Error;

use crate::domain::DomainError;

/// An orphaned node together with the declared parents it is still missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingParents {
    pub id: String,
    pub missing: Vec<String>,
}

impl fmt::Display for MissingParents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (missing: {})", self.id, self.missing.join(", "))
    }
}

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("batch is incomplete: {} orphaned node(s)", .orphans.len())]
    IncompleteBatch { orphans: Vec<MissingParents> },

    #[error("batch has {} node(s) no root leads to", .ids.len())]
    Unreachable { ids: Vec<String> },

    #[error("removing {id} failed after {removed} successful removal(s)")]
    RemovalFailed {
        id: String,
        removed: usize,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest: {message}")]
    Manifest { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
