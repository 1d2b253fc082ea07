//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ObjectRemover, CommandRunner)
//! but are themselves concrete structs, not traits.

mod purge;

pub use purge::{PurgeReport, PurgeService};
