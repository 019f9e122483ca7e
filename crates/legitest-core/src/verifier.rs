use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use legitest_git::CommitId;
use legitest_logging::{LogEvent, Logger};
use legitest_runner::{RunnerConfig, TestRunner};

use crate::{
    ChangeSet, CommitReport, DifferentialRunner, ProjectLayout, RunReport, VerifyError, Workspace,
};

/// Judges a batch of commits inside one workspace.
///
/// Commits are examined strictly one after another: each differential run
/// rewrites the shared working tree.
pub struct Verifier<'a> {
    runner: &'a dyn TestRunner,
    layout: ProjectLayout,
    logger: Arc<Logger>,
}

impl<'a> Verifier<'a> {
    pub fn new(runner: &'a dyn TestRunner, layout: ProjectLayout, logger: Arc<Logger>) -> Self {
        Self {
            runner,
            layout,
            logger,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Fail early when the test command cannot be launched at all
    pub async fn check_environment(&self) -> Result<(), VerifyError> {
        if self.runner.is_available().await {
            Ok(())
        } else {
            Err(VerifyError::TestRunnerUnavailable(
                self.runner.program().display().to_string(),
            ))
        }
    }

    /// Resolve every reference before anything runs; a single bad reference
    /// aborts the whole batch
    pub fn resolve_all(
        &self,
        workspace: &Workspace,
        references: &[String],
    ) -> Result<Vec<(String, CommitId)>, VerifyError> {
        references
            .iter()
            .map(|reference| -> Result<(String, CommitId), VerifyError> {
                let commit = workspace.git().resolve(reference)?;
                self.logger.log(&LogEvent::ReferenceResolved {
                    reference: reference.clone(),
                    commit: commit.abbreviated(),
                });
                Ok((reference.clone(), commit))
            })
            .collect()
    }

    /// Examine every reference in order, handing each finished commit to
    /// `on_commit` as soon as it is judged.
    ///
    /// Illegitimate commits do not stop the batch. A git failure does, and
    /// commits after it are missing from the result.
    pub async fn run<F>(
        &self,
        workspace: &Workspace,
        references: &[String],
        mut on_commit: F,
    ) -> Result<RunReport, VerifyError>
    where
        F: FnMut(&CommitReport),
    {
        let started = Instant::now();
        let resolved = self.resolve_all(workspace, references)?;

        let mut report = RunReport::new();
        for (reference, commit) in resolved {
            let entry = self.examine(workspace, reference, commit).await?;

            self.logger.log(&LogEvent::VerdictReached {
                commit: commit.abbreviated(),
                verdict: entry.verdict.short_description(),
                legitimate: !entry.verdict.is_failure(),
            });
            on_commit(&entry);
            report.push(entry);
        }

        self.logger.log(&LogEvent::RunCompleted {
            commits: report.commits().len(),
            failures: report.failures(),
            duration_secs: started.elapsed().as_secs_f64(),
        });

        Ok(report)
    }

    async fn examine(
        &self,
        workspace: &Workspace,
        reference: String,
        commit: CommitId,
    ) -> Result<CommitReport, VerifyError> {
        let files = workspace.git().changed_files(commit)?;
        let change_set = ChangeSet::classify(&files, &self.layout);

        self.logger.log(&LogEvent::CommitClassified {
            commit: commit.abbreviated(),
            files_changed: change_set.files_changed,
            touches_tests: change_set.touches_tests,
            touches_code: change_set.touches_production_code,
        });

        if let Some(verdict) = change_set.triage() {
            debug!(commit = %commit, verdict = %verdict, "Settled without running tests");
            return Ok(CommitReport::triaged(reference, commit, change_set, verdict));
        }

        let differential = DifferentialRunner::new(
            workspace.git(),
            self.runner,
            &self.layout,
            RunnerConfig::new(workspace.path().to_path_buf()),
            self.logger.clone(),
        );
        let results = differential.evaluate(commit).await?;

        let entry = CommitReport::evaluated(reference, commit, change_set, &results);
        info!(commit = %commit, verdict = %entry.verdict, "Commit judged");
        Ok(entry)
    }
}
