//! # legitest-runner
//!
//! Test suite execution for legitest.
//!
//! A [`TestRunner`] runs a project's suite inside a working copy and returns
//! a [`TestRun`]: a pass/fail [`TestOutcome`] plus captured output. Failing
//! tests and commands that cannot start are both data, so callers branch on
//! the outcome instead of on errors.

mod command;
mod output;
mod spawner;
mod traits;

pub use command::{CommandTestRunner, DEFAULT_TEST_COMMAND};
pub use output::{OutputCallback, OutputType, TestOutcome, TestRun};
pub use spawner::ProcessSpawner;
pub use traits::{RunnerConfig, RunnerError, TestRunner};
