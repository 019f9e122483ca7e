use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Which stream a line of test output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Stdout,
    Stderr,
}

/// Callback invoked for each line the test command prints
pub type OutputCallback = Arc<dyn Fn(&str, OutputType) + Send + Sync>;

/// Pass/fail signal of one test suite invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestOutcome::Passed => write!(f, "passed"),
            TestOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Result of running the test suite once against a working copy.
///
/// A command that could not be started is a `Failed` run whose stderr holds
/// the spawn error; there is no separate error channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    pub outcome: TestOutcome,
    pub stdout: String,
    pub stderr: String,
    /// Exit code from the process, -1 when killed by a signal or never started
    pub exit_code: i32,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl TestRun {
    pub fn new(stdout: String, stderr: String, exit_code: i32, duration: Duration) -> Self {
        let outcome = if exit_code == 0 {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed
        };
        Self {
            outcome,
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    /// A run whose command never produced an exit status
    pub fn not_started(error: impl std::fmt::Display, duration: Duration) -> Self {
        Self {
            outcome: TestOutcome::Failed,
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: -1,
            duration,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
