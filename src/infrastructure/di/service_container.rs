//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::PurgeService;
use crate::config::Settings;
use crate::infrastructure::remover::{CommandRemover, DryRunRemover};
use crate::infrastructure::traits::{CommandRunner, ObjectRemover, RealCommandRunner};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding the settings and I/O boundaries services are built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealCommandRunner))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, cmd: Arc<dyn CommandRunner>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, cmd }
    }

    /// Remover for a run: logs only when `dry_run`, else the configured command.
    pub fn remover(&self, dry_run: bool) -> InfraResult<Arc<dyn ObjectRemover>> {
        if dry_run {
            debug!("using dry-run remover");
            return Ok(Arc::new(DryRunRemover));
        }
        let remover = CommandRemover::new(self.cmd.clone(), self.settings.remove_command.clone())
            .map_err(|e| InfraError::Remover {
                message: format!("{e}; set remove_command in the config file or PURGETREE_REMOVE_COMMAND"),
            })?;
        Ok(Arc::new(remover))
    }

    pub fn purge_service(&self, dry_run: bool) -> InfraResult<PurgeService> {
        Ok(PurgeService::new(self.remover(dry_run)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remover_without_command_fails_unless_dry_run() {
        let container = ServiceContainer::new(Settings::default());

        assert!(matches!(
            container.remover(false),
            Err(InfraError::Remover { .. })
        ));
        assert!(container.remover(true).is_ok());
    }
}
