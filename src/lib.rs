//! purgetree: leaf-first deletion of hierarchically related repository objects.
//!
//! A batch of objects is loaded into a [`domain::Tree`]; objects may arrive in
//! any order and may have several parents. The tree hands out one removable
//! leaf at a time until nothing is left.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{DomainError, Node, Tree};
