use std::sync::Arc;
use tracing::{debug, info};

use legitest_git::{CommitId, GitClient};
use legitest_logging::{LogEvent, Logger, Phase, StreamType};
use legitest_runner::{OutputCallback, OutputType, RunnerConfig, TestRun, TestRunner};

use crate::{ProjectLayout, Verdict, VerifyError};

/// The two test runs made for one commit
#[derive(Debug, Clone)]
pub struct PhaseResults {
    /// Tests and production code as of the commit
    pub post_change: TestRun,
    /// Tests as of the commit, production code as of its parent
    pub pre_change: TestRun,
}

impl PhaseResults {
    /// The suite did not pass against the commit itself
    pub fn could_not_pass(&self) -> bool {
        !self.post_change.passed()
    }

    /// The suite still passed after the production change was reverted
    pub fn tests_do_not_break_anything(&self) -> bool {
        self.pre_change.passed()
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_phases(self.post_change.outcome, self.pre_change.outcome)
    }
}

/// Runs the two-phase protocol for commits that change tests and code.
///
/// Phase A resets the workspace to the commit and expects the suite to pass.
/// Phase B reverts only the production-code area to the parent commit, keeps
/// the new tests, and expects the suite to fail. Both phases always run.
pub struct DifferentialRunner<'a> {
    git: &'a GitClient,
    runner: &'a dyn TestRunner,
    layout: &'a ProjectLayout,
    config: RunnerConfig,
    logger: Arc<Logger>,
}

impl<'a> DifferentialRunner<'a> {
    pub fn new(
        git: &'a GitClient,
        runner: &'a dyn TestRunner,
        layout: &'a ProjectLayout,
        config: RunnerConfig,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            git,
            runner,
            layout,
            config,
            logger,
        }
    }

    /// Run both phases against `commit`.
    ///
    /// Test failures are part of the result; only git failures while
    /// rebuilding a phase's working tree are returned as errors.
    pub async fn evaluate(&self, commit: CommitId) -> Result<PhaseResults, VerifyError> {
        self.git.reset_hard(commit)?;
        let post_change = self.run_phase(commit, Phase::PostChange).await;

        let parent = self.git.parent(commit)?;
        if parent.is_none() {
            debug!(commit = %commit, "Root commit, reverting production code to empty tree");
        }
        self.git.restore_paths(parent, &[self.layout.code_dir.as_path()])?;
        let pre_change = self.run_phase(commit, Phase::PreChange).await;

        let results = PhaseResults {
            post_change,
            pre_change,
        };

        info!(
            commit = %commit,
            could_not_pass = results.could_not_pass(),
            tests_do_not_break_anything = results.tests_do_not_break_anything(),
            "Differential run finished"
        );

        Ok(results)
    }

    fn create_output_callback(&self, commit: &str, phase: Phase) -> OutputCallback {
        let logger = self.logger.clone();
        let commit = commit.to_string();
        Arc::new(move |line: &str, output_type: OutputType| {
            let stream = match output_type {
                OutputType::Stdout => StreamType::Stdout,
                OutputType::Stderr => StreamType::Stderr,
            };
            logger.log(&LogEvent::TestOutputLine {
                commit: commit.clone(),
                phase,
                stream,
                line: line.to_string(),
            });
        })
    }

    async fn run_phase(&self, commit: CommitId, phase: Phase) -> TestRun {
        let short = commit.abbreviated();

        self.logger.log(&LogEvent::PhaseStarted {
            commit: short.clone(),
            phase,
        });

        let callback = self.create_output_callback(&short, phase);
        let run = self
            .runner
            .run_with_callback(&self.config, Some(callback))
            .await;

        self.logger.log(&LogEvent::PhaseCompleted {
            commit: short,
            phase,
            passed: run.passed(),
            exit_code: run.exit_code,
            duration_secs: run.duration.as_secs_f64(),
        });

        run
    }
}
