//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Tree, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::manifest::load_manifest;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    validate_args(cli)?;
    match &cli.command {
        Some(Commands::Check { manifest }) => cmd_check(cli, manifest),
        Some(Commands::Plan { manifest }) => cmd_plan(cli, manifest),
        Some(Commands::Tree { manifest }) => cmd_tree(cli, manifest),
        Some(Commands::Run {
            manifest,
            dry_run,
            limit,
        }) => cmd_run(cli, manifest, *dry_run, *limit),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `purgetree --help`".into(),
        )),
    }
}

/// Reject argument values clap accepts but a purge cannot work with.
fn validate_args(cli: &Cli) -> CliResult<()> {
    if cli.root.as_deref().is_some_and(|r| r.trim().is_empty()) {
        return Err(CliError::InvalidArgs("--root must not be empty".into()));
    }
    if let Some(Commands::Run { limit: Some(0), .. }) = &cli.command {
        return Err(CliError::InvalidArgs("--limit must be at least 1".into()));
    }
    Ok(())
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("get current directory", e))),
    }
}

fn load_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let dir = config_dir(cli)?;
    let settings = Settings::load(Some(dir.as_path()))?;
    debug!(?settings, "settings loaded");
    Ok(ServiceContainer::new(settings))
}

/// Manifest into a tree. Root id precedence: `--root`, manifest, config.
fn load_tree(cli: &Cli, container: &ServiceContainer, path: &Path) -> CliResult<Tree> {
    let mut manifest = load_manifest(path)?;
    if let Some(root) = &cli.root {
        manifest.root = Some(root.clone());
    }
    Ok(manifest.into_tree(&container.settings.root_id)?)
}

/// Print the details a one-line preflight error leaves out.
fn report_preflight_error(e: ApplicationError) -> ApplicationError {
    match &e {
        ApplicationError::IncompleteBatch { orphans } => {
            output::header("Orphans");
            for orphan in orphans {
                output::failure(orphan);
            }
        }
        ApplicationError::Unreachable { ids } => {
            output::header("Unreachable");
            for id in ids {
                output::failure(id);
            }
        }
        _ => {}
    }
    e
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, manifest: &Path) -> CliResult<()> {
    let container = load_container(cli)?;
    let mut tree = load_tree(cli, &container, manifest)?;
    let service = container.purge_service(true)?;

    service
        .preflight(&mut tree)
        .map_err(report_preflight_error)?;

    output::success(&format!(
        "batch complete: {} object(s) under {} root(s) of {}",
        tree.len(),
        tree.root_nodes().len(),
        tree.root_id()
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_plan(cli: &Cli, manifest: &Path) -> CliResult<()> {
    let container = load_container(cli)?;
    let mut tree = load_tree(cli, &container, manifest)?;
    let service = container.purge_service(true)?;

    let order = service.plan(&mut tree).map_err(report_preflight_error)?;
    for id in order {
        output::info(&id);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, manifest: &Path) -> CliResult<()> {
    let container = load_container(cli)?;
    let mut tree = load_tree(cli, &container, manifest)?;
    tree.reconcile()?;

    output::info(&tree.to_tree_string());
    let orphans = tree.orphans();
    if !orphans.is_empty() {
        output::warning(&format!("{} orphaned object(s) not shown", orphans.len()));
        for orphan in orphans {
            output::detail(orphan);
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_run(cli: &Cli, manifest: &Path, dry_run: bool, limit: Option<usize>) -> CliResult<()> {
    let container = load_container(cli)?;
    let mut tree = load_tree(cli, &container, manifest)?;
    let service = container.purge_service(dry_run)?;

    let report = service
        .purge(&mut tree, limit)
        .map_err(report_preflight_error)?;

    let verb = if dry_run { "would remove" } else { "removed" };
    for id in &report.removed {
        output::detail(&format!("{verb} {id}"));
    }
    output::success(&format!(
        "{} {} object(s) in {}ms",
        verb,
        report.removed.len(),
        report.elapsed().num_milliseconds()
    ));
    if !report.is_complete() {
        output::warning(&format!("{} object(s) remaining", report.remaining));
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let container = load_container(cli)?;
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let marker = |p: &Path| if p.exists() { "" } else { " (missing)" };
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}{}", path.display(), marker(&path))),
                None => output::detail("global: unavailable"),
            }
            let local = local_config_path(&config_dir(cli)?);
            output::detail(&format!("local:  {}{}", local.display(), marker(&local)));
        }
    }
    Ok(())
}
