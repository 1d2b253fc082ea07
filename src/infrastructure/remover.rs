//! Object remover implementations
//!
//! `CommandRemover` shells out to a configured program, `DryRunRemover`
//! only logs what would have been removed.

use std::io;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::infrastructure::traits::{CommandRunner, ObjectRemover};

/// Placeholder substituted with the object id in every command argument.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Runs an argv template once per object.
///
/// Every occurrence of `{id}` in the program or its arguments is replaced by
/// the object id. A non-zero exit status counts as failure.
pub struct CommandRemover {
    cmd: Arc<dyn CommandRunner>,
    template: Vec<String>,
}

impl CommandRemover {
    /// Create a remover; `template` must contain at least the program.
    pub fn new(cmd: Arc<dyn CommandRunner>, template: Vec<String>) -> io::Result<Self> {
        if template.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "remove command is empty",
            ));
        }
        Ok(Self { cmd, template })
    }

    /// Program and arguments for one object.
    pub fn argv(&self, id: &str) -> Vec<String> {
        self.template
            .iter()
            .map(|part| part.replace(ID_PLACEHOLDER, id))
            .collect()
    }
}

impl ObjectRemover for CommandRemover {
    #[instrument(level = "debug", skip(self))]
    fn remove(&self, id: &str) -> io::Result<()> {
        let argv = self.argv(id);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "remove command is empty"))?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!(program = %program, ?args, "running remove command");

        let output = self.cmd.run(program, &args)?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Err(io::Error::other(format!(
            "{} exited with {}: {}",
            program,
            code,
            stderr.trim()
        )))
    }
}

/// Removes nothing.
#[derive(Debug, Default)]
pub struct DryRunRemover;

impl ObjectRemover for DryRunRemover {
    fn remove(&self, id: &str) -> io::Result<()> {
        info!(id, "dry run: would remove");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverRun;

    impl CommandRunner for NeverRun {
        fn run(&self, _cmd: &str, _args: &[&str]) -> io::Result<std::process::Output> {
            Err(io::Error::other("not expected"))
        }
    }

    #[test]
    fn test_argv_substitutes_every_placeholder() {
        let remover = CommandRemover::new(
            Arc::new(NeverRun),
            vec!["purge".into(), "--pid={id}".into(), "{id}/{id}".into()],
        )
        .unwrap();

        assert_eq!(remover.argv("obj:1"), ["purge", "--pid=obj:1", "obj:1/obj:1"]);
    }

    #[test]
    fn test_new_rejects_empty_template() {
        assert!(CommandRemover::new(Arc::new(NeverRun), vec![]).is_err());
        assert!(CommandRemover::new(Arc::new(NeverRun), vec![" ".into()]).is_err());
    }

    #[test]
    fn test_dry_run_always_succeeds() {
        assert!(DryRunRemover.remove("anything").is_ok());
    }
}
