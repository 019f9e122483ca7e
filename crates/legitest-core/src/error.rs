use std::path::PathBuf;
use thiserror::Error;

use legitest_git::GitError;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("No git repository found within {depth} directories of {}", start.display())]
    RepositoryNotFound { start: PathBuf, depth: usize },

    #[error("Cannot resolve reference '{0}' to a commit")]
    UnresolvableReference(String),

    #[error("Git error: {0}")]
    GitError(GitError),

    #[error("Test runner '{0}' is not available. Make sure it's installed and in PATH.")]
    TestRunnerUnavailable(String),

    #[error("Workspace error: {0}")]
    WorkspaceError(#[from] std::io::Error),
}

impl From<GitError> for VerifyError {
    fn from(error: GitError) -> Self {
        match error {
            GitError::UnresolvableReference(reference) => Self::UnresolvableReference(reference),
            other => Self::GitError(other),
        }
    }
}
