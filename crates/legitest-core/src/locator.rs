use std::path::{Path, PathBuf};
use tracing::debug;

use crate::VerifyError;

/// How many directories, starting with the start directory itself, are
/// searched for a repository
pub const SEARCH_DEPTH: usize = 10;

/// Entry that marks a directory as a repository root
pub const REPOSITORY_MARKER: &str = ".git";

/// Absolute path of the canonical repository under verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    root: PathBuf,
}

impl RepositoryHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Walk upward from `start` to the nearest directory holding a `.git` entry
pub fn locate_repository(start: &Path) -> Result<RepositoryHandle, VerifyError> {
    let start = start.canonicalize()?;

    for dir in start.ancestors().take(SEARCH_DEPTH) {
        if dir.join(REPOSITORY_MARKER).exists() {
            debug!(root = %dir.display(), "Located repository");
            return Ok(RepositoryHandle {
                root: dir.to_path_buf(),
            });
        }
    }

    Err(VerifyError::RepositoryNotFound {
        start,
        depth: SEARCH_DEPTH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn nested(root: &Path, levels: usize) -> PathBuf {
        let mut dir = root.to_path_buf();
        for i in 0..levels {
            dir.push(format!("d{}", i));
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_finds_repository_at_start() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();

        let handle = locate_repository(tmp.path()).unwrap();
        assert_eq!(handle.root(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_finds_repository_in_ancestor() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        let start = nested(tmp.path(), 3);

        let handle = locate_repository(&start).unwrap();
        assert_eq!(handle.root(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_marker_file_counts() {
        // Worktrees and submodules use a `.git` file instead of a directory
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join(".git"), "gitdir: ../elsewhere").unwrap();

        assert!(locate_repository(tmp.path()).is_ok());
    }

    #[test]
    fn test_search_is_bounded() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();

        let within = nested(tmp.path(), SEARCH_DEPTH - 1);
        assert!(locate_repository(&within).is_ok());

        let beyond = nested(tmp.path(), SEARCH_DEPTH);
        let result = locate_repository(&beyond);
        assert!(matches!(
            result,
            Err(VerifyError::RepositoryNotFound { depth, .. }) if depth == SEARCH_DEPTH
        ));
    }
}
