use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

use legitest_git::GitClient;

use crate::{RepositoryHandle, VerifyError};

const CLONE_DIR_NAME: &str = "repo";

/// Disposable clone of the repository under verification.
///
/// The backing temporary directory is removed by [`Workspace::close`] or,
/// failing that, when the workspace is dropped, so every exit path cleans up.
/// Phases overwrite the working tree destructively; one workspace serves one
/// run at a time.
pub struct Workspace {
    // Declared first so the repository handle is released before the
    // directory is removed
    git: GitClient,
    path: PathBuf,
    dir: TempDir,
}

impl Workspace {
    /// Clone `repository` into a fresh, uniquely named temporary directory
    pub fn create(repository: &RepositoryHandle) -> Result<Self, VerifyError> {
        let dir = tempfile::Builder::new().prefix("legitest-").tempdir()?;
        let path = dir.path().join(CLONE_DIR_NAME);

        let git = GitClient::clone_into(repository.root(), &path)?;

        info!(
            repository = %repository.root().display(),
            workspace = %path.display(),
            "Created workspace"
        );

        Ok(Self { git, path, dir })
    }

    /// Working tree of the clone; every git and test invocation runs here
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary directory owning the clone
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self) -> &GitClient {
        &self.git
    }

    /// Remove the workspace, reporting removal failures instead of ignoring
    /// them. Returns the directory that was removed.
    pub fn close(self) -> Result<PathBuf, VerifyError> {
        let Workspace { git, dir, .. } = self;
        drop(git);

        let root = dir.path().to_path_buf();
        dir.close()?;

        info!(workspace = %root.display(), "Removed workspace");
        Ok(root)
    }
}
