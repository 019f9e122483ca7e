use serde::Serialize;

use legitest_git::CommitId;
use legitest_runner::{TestOutcome, TestRun};

use crate::{ChangeSet, PhaseResults, Verdict};

/// Outcome of one phase as it appears in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRecord {
    pub outcome: TestOutcome,
    pub exit_code: i32,
    pub duration_secs: f64,
}

impl From<&TestRun> for PhaseRecord {
    fn from(run: &TestRun) -> Self {
        Self {
            outcome: run.outcome,
            exit_code: run.exit_code,
            duration_secs: run.duration.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub post_change: PhaseRecord,
    pub pre_change: PhaseRecord,
}

/// Verdict for one examined commit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitReport {
    /// Reference as the user supplied it
    pub reference: String,
    pub commit: CommitId,
    pub verdict: Verdict,
    pub change_set: ChangeSet,
    /// Present only when the differential protocol ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<PhaseSummary>,
}

impl CommitReport {
    /// A commit settled by classification alone
    pub fn triaged(
        reference: String,
        commit: CommitId,
        change_set: ChangeSet,
        verdict: Verdict,
    ) -> Self {
        Self {
            reference,
            commit,
            verdict,
            change_set,
            phases: None,
        }
    }

    /// A commit judged by the differential protocol
    pub fn evaluated(
        reference: String,
        commit: CommitId,
        change_set: ChangeSet,
        results: &PhaseResults,
    ) -> Self {
        Self {
            reference,
            commit,
            verdict: results.verdict(),
            change_set,
            phases: Some(PhaseSummary {
                post_change: PhaseRecord::from(&results.post_change),
                pre_change: PhaseRecord::from(&results.pre_change),
            }),
        }
    }

    /// `<abbreviated-id> <message>` lines, one per finding
    pub fn lines(&self) -> Vec<String> {
        let short = self.commit.abbreviated();
        self.verdict
            .messages()
            .into_iter()
            .map(|message| format!("{} {}", short, message))
            .collect()
    }
}

/// Ordered verdicts of a run plus its aggregate status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    commits: Vec<CommitReport>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: CommitReport) {
        self.commits.push(report);
    }

    pub fn commits(&self) -> &[CommitReport] {
        &self.commits
    }

    pub fn failures(&self) -> usize {
        self.commits
            .iter()
            .filter(|c| c.verdict.is_failure())
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// 0 when every commit is legitimate or exempt, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Report lines for every commit, in input order
    pub fn lines(&self) -> Vec<String> {
        self.commits.iter().flat_map(|c| c.lines()).collect()
    }

    /// Pretty JSON document with the commits and the exit code
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            commits: &'a [CommitReport],
            failures: usize,
            exit_code: i32,
        }

        serde_json::to_string_pretty(&Document {
            commits: &self.commits,
            failures: self.failures(),
            exit_code: self.exit_code(),
        })
    }
}
