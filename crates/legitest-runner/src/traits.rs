use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{OutputCallback, TestRun};

/// Errors raised while setting up or driving a test process.
///
/// These never describe a failing test suite; that is a [`TestRun`] whose
/// outcome is `Failed`.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn test process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Test command is empty")]
    EmptyCommand,

    #[error("Test execution failed: {0}")]
    ExecutionFailed(String),
}

/// Configuration for one test suite invocation
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Working copy the suite runs in
    pub working_dir: PathBuf,
    /// Additional environment variables
    pub env_vars: HashMap<String, String>,
}

impl RunnerConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env_vars.insert(key, value);
        self
    }
}

/// Something that can execute a project's test suite against a working copy
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Human-readable name, e.g. the command line
    fn name(&self) -> &str;

    /// Run the suite once
    async fn run(&self, config: &RunnerConfig) -> TestRun {
        self.run_with_callback(config, None).await
    }

    /// Run the suite once, streaming output lines to `on_output`
    async fn run_with_callback(
        &self,
        config: &RunnerConfig,
        on_output: Option<OutputCallback>,
    ) -> TestRun;

    /// Check that the underlying tool can be launched at all
    async fn is_available(&self) -> bool;

    /// Program launched for each run
    fn program(&self) -> &Path;
}
