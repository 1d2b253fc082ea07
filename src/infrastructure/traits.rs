//! I/O boundary traits for testability
//!
//! These traits abstract external side effects, allowing services
//! to be tested with mock implementations.

use std::io;
use std::process::Output;

/// Command execution abstraction for testability.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;
}

/// Destroys one repository object.
///
/// Called by the purge loop only for leaves, one id at a time. An error
/// stops the batch.
pub trait ObjectRemover: Send + Sync {
    fn remove(&self, id: &str) -> io::Result<()>;
}

/// Real command runner using `std::process::Command`.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }
}
