use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use crate::{OutputCallback, ProcessSpawner, RunnerConfig, RunnerError, TestRun, TestRunner};

/// Default suite: Python's unittest discovery from the working copy root
pub const DEFAULT_TEST_COMMAND: &[&str] = &["python3", "-m", "unittest", "discover"];

/// Runs the test suite as an external command; exit status 0 means passed
pub struct CommandTestRunner {
    program: PathBuf,
    args: Vec<String>,
    display: String,
}

impl CommandTestRunner {
    /// Build from a command line split into program and arguments
    pub fn from_command<S: AsRef<str>>(command: &[S]) -> Result<Self, RunnerError> {
        let (program, args) = command.split_first().ok_or(RunnerError::EmptyCommand)?;
        if program.as_ref().trim().is_empty() {
            return Err(RunnerError::EmptyCommand);
        }

        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        let display = command
            .iter()
            .map(|part| part.as_ref())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Self {
            program: PathBuf::from(program.as_ref()),
            args,
            display,
        })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Default for CommandTestRunner {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_TEST_COMMAND[0]),
            args: DEFAULT_TEST_COMMAND[1..]
                .iter()
                .map(|a| a.to_string())
                .collect(),
            display: DEFAULT_TEST_COMMAND.join(" "),
        }
    }
}

#[async_trait]
impl TestRunner for CommandTestRunner {
    fn name(&self) -> &str {
        &self.display
    }

    fn program(&self) -> &Path {
        &self.program
    }

    /// Bare program names must be found on `PATH` and absolute paths must
    /// exist. Relative paths such as `./run_tests.sh` are looked up in the
    /// working copy at run time and are accepted here.
    async fn is_available(&self) -> bool {
        if self.program.is_absolute() {
            return self.program.is_file();
        }
        if self.program.components().count() > 1 {
            return true;
        }
        find_in_path(&self.program).is_some()
    }

    async fn run_with_callback(
        &self,
        config: &RunnerConfig,
        on_output: Option<OutputCallback>,
    ) -> TestRun {
        debug!(command = %self.display, "Running test suite");

        let start = Instant::now();
        match ProcessSpawner::spawn_with_callback(&self.program, &self.args, config, on_output)
            .await
        {
            Ok(run) => run,
            Err(e) => {
                warn!(command = %self.display, error = %e, "Test command did not run to completion");
                TestRun::not_started(e, start.elapsed())
            }
        }
    }
}

fn find_in_path(binary: &Path) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for segment in std::env::split_paths(&path_var) {
        let candidate = segment.join(binary);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}
