use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Verdict;

/// Directories that hold the test suite and the production code, relative to
/// the repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayout {
    pub tests_dir: PathBuf,
    pub code_dir: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from("tests"),
            code_dir: PathBuf::from("src"),
        }
    }
}

impl ProjectLayout {
    pub fn new(tests_dir: impl Into<PathBuf>, code_dir: impl Into<PathBuf>) -> Self {
        Self {
            tests_dir: tests_dir.into(),
            code_dir: code_dir.into(),
        }
    }
}

/// Which areas of the project a commit touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub touches_tests: bool,
    pub touches_production_code: bool,
    pub files_changed: usize,
}

impl ChangeSet {
    /// Reduce a commit's changed paths to the two area facts.
    ///
    /// Matching is by whole path components, so `tests_util/x.py` is not in
    /// the `tests` area.
    pub fn classify<P: AsRef<Path>>(files: &[P], layout: &ProjectLayout) -> Self {
        let in_area = |area: &Path| files.iter().any(|file| file.as_ref().starts_with(area));

        Self {
            touches_tests: in_area(&layout.tests_dir),
            touches_production_code: in_area(&layout.code_dir),
            files_changed: files.len(),
        }
    }

    /// Verdict reachable without running any tests, if there is one.
    ///
    /// Only a commit that changes both tests and production code has anything
    /// for the differential protocol to measure: without a production change,
    /// reverting production code to the parent leaves the tree unchanged.
    pub fn triage(&self) -> Option<Verdict> {
        match (self.touches_tests, self.touches_production_code) {
            (false, true) => Some(Verdict::CodeChangeWithoutTests),
            (_, false) => Some(Verdict::NoUnitTestChange),
            (true, true) => None,
        }
    }
}
