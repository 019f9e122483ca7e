//! # legitest-core
//!
//! Decides whether the unit tests a commit adds actually exercise the code
//! it changes.
//!
//! For a commit that touches both the tests area and the production-code
//! area, the suite runs twice in a disposable clone: once against the commit
//! as-is (must pass) and once with only the production code reverted to the
//! parent commit (must fail). Tests that keep passing without the code they
//! claim to test are vacuous.
//!
//! ## Key Types
//!
//! - [`locate_repository`] / [`RepositoryHandle`] - Find the repository root
//! - [`Workspace`] - Disposable clone, removed on every exit path
//! - [`ChangeSet`] / [`ProjectLayout`] - Which areas a commit touched
//! - [`DifferentialRunner`] - The two-phase test protocol
//! - [`Verdict`] / [`RunReport`] - Per-commit judgement and aggregate status
//! - [`Verifier`] - Drives a batch of commits end to end

mod classifier;
mod differential;
mod error;
mod locator;
mod report;
mod verdict;
mod verifier;
mod workspace;

pub use classifier::{ChangeSet, ProjectLayout};
pub use differential::{DifferentialRunner, PhaseResults};
pub use error::VerifyError;
pub use locator::{locate_repository, RepositoryHandle, REPOSITORY_MARKER, SEARCH_DEPTH};
pub use report::{CommitReport, PhaseRecord, PhaseSummary, RunReport};
pub use verdict::{
    Verdict, MSG_CODE_WITHOUT_TESTS, MSG_COULD_NOT_PASS, MSG_LEGITIMATE, MSG_NO_TEST_CHANGE,
    MSG_TESTS_DO_NOT_BREAK,
};
pub use verifier::Verifier;
pub use workspace::Workspace;
