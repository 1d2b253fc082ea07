//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/purgetree/purgetree.toml`
//! 3. Local config: `<dir>/.purgetree.toml`
//! 4. Environment variables: `PURGETREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, IoResultExt};

/// Default container id of a deletion batch.
pub const DEFAULT_ROOT_ID: &str = "trashcan";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_id: Option<String>,
    pub remove_command: Option<Vec<String>>,
}

/// Unified configuration for purgetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Container id that root objects declare as their parent
    pub root_id: String,
    /// Program and arguments run once per object; `{id}` is substituted
    pub remove_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.into(),
            remove_command: Vec::new(),
        }
    }
}

/// Get the XDG config directory for purgetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "purgetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("purgetree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".purgetree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input alone if expansion fails.
fn expand_env_vars(value: &str) -> String {
    shellexpand::full(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl Settings {
    /// Overlay values win where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_id: overlay
                .root_id
                .clone()
                .unwrap_or_else(|| self.root_id.clone()),
            remove_command: overlay
                .remove_command
                .clone()
                .unwrap_or_else(|| self.remove_command.clone()),
        }
    }

    /// Expand the command's program; arguments are passed through verbatim.
    fn expand_paths(&mut self) {
        if let Some(program) = self.remove_command.first_mut() {
            *program = expand_env_vars(program);
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.purgetree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = current.apply_env_overrides(Self::env_source())?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    fn env_source() -> Environment {
        Environment::with_prefix("PURGETREE")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("remove_command")
    }

    /// Apply PURGETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_id") {
            self.root_id = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("remove_command") {
            self.remove_command = val;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.root_id.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "root_id must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Render as TOML, as written in a config file.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::env_source().source(Some(map))
    }

    #[test]
    fn test_env_overrides_replace_values() {
        let settings = Settings::default()
            .apply_env_overrides(env(&[
                ("PURGETREE_ROOT_ID", "bin"),
                ("PURGETREE_REMOVE_COMMAND", "purge,--pid,{id}"),
            ]))
            .unwrap();

        assert_eq!(settings.root_id, "bin");
        assert_eq!(settings.remove_command, ["purge", "--pid", "{id}"]);
    }

    #[test]
    fn test_env_overrides_without_vars_keep_settings() {
        let settings = Settings::default().apply_env_overrides(env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_merge_with_only_overrides_specified_fields() {
        let raw = RawSettings {
            root_id: None,
            remove_command: Some(vec!["rm".into()]),
        };

        let merged = Settings::default().merge_with(&raw);

        assert_eq!(merged.root_id, DEFAULT_ROOT_ID);
        assert_eq!(merged.remove_command, ["rm"]);
    }

    #[test]
    fn test_expand_paths_expands_program_only() {
        std::env::set_var("PURGETREE_TEST_BIN", "/opt/bin");
        let mut settings = Settings {
            root_id: DEFAULT_ROOT_ID.into(),
            remove_command: vec!["$PURGETREE_TEST_BIN/purge".into(), "$literal".into()],
        };

        settings.expand_paths();

        assert_eq!(settings.remove_command, ["/opt/bin/purge", "$literal"]);
    }
}
