//! Project configuration file support for legitest.
//!
//! Loads configuration from `legitest.toml` at the repository root.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use legitest_core::ProjectLayout;
use legitest_runner::DEFAULT_TEST_COMMAND;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "legitest.toml";

/// Project-level configuration loaded from `legitest.toml`
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory holding the unit tests
    pub tests_dir: Option<PathBuf>,
    /// Directory holding the production code the tests exercise
    pub code_dir: Option<PathBuf>,
    /// Command that runs the whole suite, e.g. `["pytest", "-q"]`
    pub test_command: Option<Vec<String>>,
}

/// Values given on the command line; each one overrides the file
#[derive(Debug, Default)]
pub struct Overrides {
    pub tests_dir: Option<PathBuf>,
    pub code_dir: Option<PathBuf>,
    pub test_command: Option<Vec<String>>,
}

/// Fully resolved settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub layout: ProjectLayout,
    pub test_command: Vec<String>,
}

impl ProjectConfig {
    /// Load configuration from the repository root.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(repo_root: &Path) -> Result<Option<Self>> {
        let config_path = repo_root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Merge with command-line overrides and defaults.
    /// Priority: CLI flag > config file > built-in default
    pub fn resolve(self, overrides: Overrides) -> Settings {
        let defaults = ProjectLayout::default();

        let layout = ProjectLayout {
            tests_dir: overrides
                .tests_dir
                .or(self.tests_dir)
                .unwrap_or(defaults.tests_dir),
            code_dir: overrides
                .code_dir
                .or(self.code_dir)
                .unwrap_or(defaults.code_dir),
        };

        let test_command = overrides
            .test_command
            .or(self.test_command)
            .unwrap_or_else(|| DEFAULT_TEST_COMMAND.iter().map(|s| s.to_string()).collect());

        Settings {
            layout,
            test_command,
        }
    }
}
