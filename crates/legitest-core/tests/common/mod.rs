//! Shared fixtures: scratch repositories and a scripted test suite.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use git2::{Commit, IndexAddOption, Repository, Signature};
use legitest_core::{locate_repository, RepositoryHandle};
use legitest_git::CommitId;
use legitest_logging::{LogFormat, Logger};
use legitest_runner::{OutputCallback, OutputType, RunnerConfig, TestRun, TestRunner};
use tempfile::TempDir;

/// Scratch repository that commits whatever the test writes
pub struct Fixture {
    dir: TempDir,
    repo: Repository,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn handle(&self) -> RepositoryHandle {
        locate_repository(self.path()).unwrap()
    }

    /// Apply writes (`None` deletes the file) and commit them
    pub fn commit(&self, message: &str, writes: &[(&str, Option<&str>)]) -> CommitId {
        for (path, content) in writes {
            let full = self.path().join(path);
            match content {
                Some(content) => {
                    fs::create_dir_all(full.parent().unwrap()).unwrap();
                    fs::write(&full, content).unwrap();
                }
                None => fs::remove_file(&full).unwrap(),
            }
        }

        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("legitest", "legitest@example.com").unwrap();
        let parents: Vec<Commit> = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&Commit> = parents.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        CommitId::from(oid)
    }

    /// A passing baseline: one feature with a matching expectation
    pub fn baseline(&self) -> CommitId {
        self.commit(
            "baseline",
            &[
                ("src/calc", Some("v1")),
                ("tests/calc.expect", Some("v1")),
            ],
        )
    }
}

/// Test suite driven by files in the working copy.
///
/// Every `tests/<name>.expect` is one test:
/// - `any` always passes
/// - `fail` always fails
/// - anything else passes iff `src/<name>` has exactly that content
pub struct ScriptedSuite {
    runs: AtomicUsize,
    available: bool,
}

impl ScriptedSuite {
    pub fn new() -> Self {
        Self {
            runs: AtomicUsize::new(0),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            runs: AtomicUsize::new(0),
            available: false,
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    fn check(root: &Path) -> Result<usize, String> {
        let tests_dir = root.join("tests");
        let mut entries: Vec<_> = match fs::read_dir(&tests_dir) {
            Ok(entries) => entries.filter_map(Result::ok).map(|e| e.path()).collect(),
            Err(_) => return Ok(0),
        };
        entries.sort();

        let mut count = 0;
        for path in entries {
            if path.extension().and_then(|e| e.to_str()) != Some("expect") {
                continue;
            }
            count += 1;
            let name = path.file_stem().unwrap().to_string_lossy().to_string();
            let expected = fs::read_to_string(&path).unwrap();
            match expected.as_str() {
                "any" => {}
                "fail" => return Err(format!("{}: forced failure", name)),
                wanted => {
                    let actual = fs::read_to_string(root.join("src").join(&name)).ok();
                    if actual.as_deref() != Some(wanted) {
                        return Err(format!("{}: expected {:?}, got {:?}", name, wanted, actual));
                    }
                }
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl TestRunner for ScriptedSuite {
    fn name(&self) -> &str {
        "scripted"
    }

    fn program(&self) -> &Path {
        Path::new("scripted-suite")
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn run_with_callback(
        &self,
        config: &RunnerConfig,
        on_output: Option<OutputCallback>,
    ) -> TestRun {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let (stdout, stderr, code) = match Self::check(&config.working_dir) {
            Ok(count) => (format!("Ran {} tests\nOK", count), String::new(), 0),
            Err(reason) => (String::new(), format!("FAIL: {}", reason), 1),
        };
        if let Some(callback) = on_output {
            for line in stdout.lines() {
                callback(line, OutputType::Stdout);
            }
            for line in stderr.lines() {
                callback(line, OutputType::Stderr);
            }
        }
        TestRun::new(stdout, stderr, code, Duration::from_millis(1))
    }
}

pub fn test_logger() -> Arc<Logger> {
    Arc::new(Logger::new(LogFormat::Compact))
}
