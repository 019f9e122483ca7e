use git2::build::CheckoutBuilder;
use git2::{Repository, ResetType, Tree};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

use crate::CommitId;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),

    #[error("Cannot resolve reference '{0}' to a commit")]
    UnresolvableReference(String),

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

/// Typed client over a single working copy.
///
/// Every operation addresses the repository opened at construction time, so
/// callers never depend on the process working directory.
pub struct GitClient {
    repo: Repository,
}

impl GitClient {
    /// Clone `source` into `destination` and open the new working copy
    pub fn clone_into(source: &Path, destination: &Path) -> Result<Self, GitError> {
        let url = source
            .to_str()
            .ok_or_else(|| GitError::NonUtf8Path(source.to_path_buf()))?;

        debug!(
            source = %source.display(),
            destination = %destination.display(),
            "Cloning repository"
        );

        let repo = Repository::clone(url, destination)?;
        Ok(Self { repo })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Resolve a user-supplied reference (branch, tag, short hash, `HEAD~2`, ...)
    /// to the commit it names.
    ///
    /// Branches of the cloned-from repository only exist as remote-tracking
    /// refs in a fresh clone, so `origin/<reference>` is tried as well.
    pub fn resolve(&self, reference: &str) -> Result<CommitId, GitError> {
        let candidates = [reference.to_string(), format!("origin/{reference}")];

        for candidate in &candidates {
            match self
                .repo
                .revparse_single(candidate)
                .and_then(|object| object.peel_to_commit())
            {
                Ok(commit) => {
                    let id = CommitId::from(commit.id());
                    debug!(reference, commit = %id, "Resolved reference");
                    return Ok(id);
                }
                Err(e) => trace!(candidate = %candidate, error = %e, "Reference lookup failed"),
            }
        }

        Err(GitError::UnresolvableReference(reference.to_string()))
    }

    /// First parent of a commit, `None` for a root commit
    pub fn parent(&self, id: CommitId) -> Result<Option<CommitId>, GitError> {
        let commit = self.repo.find_commit(id.oid())?;
        Ok(commit.parent_ids().next().map(CommitId::from))
    }

    /// Paths changed by a commit relative to its first parent.
    ///
    /// Both the old and new side of every delta are reported, so a rename
    /// counts against the area it left as well as the one it entered. The
    /// result is sorted and free of duplicates.
    pub fn changed_files(&self, id: CommitId) -> Result<Vec<PathBuf>, GitError> {
        let commit = self.repo.find_commit(id.oid())?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = BTreeSet::new();
        for delta in diff.deltas() {
            for path in [delta.old_file().path(), delta.new_file().path()]
                .into_iter()
                .flatten()
            {
                files.insert(path.to_path_buf());
            }
        }

        debug!(commit = %id, files = files.len(), "Listed changed files");

        Ok(files.into_iter().collect())
    }

    /// Point HEAD at `id` and overwrite index and working tree to match it.
    ///
    /// Untracked and ignored files are removed too, so nothing left behind by
    /// an earlier restore or test run survives into the next state.
    pub fn reset_hard(&self, id: CommitId) -> Result<(), GitError> {
        let commit = self.repo.find_commit(id.oid())?;
        self.repo.reset(commit.as_object(), ResetType::Hard, None)?;

        // A hard reset forces its own checkout strategy, so cleaning needs a
        // second pass over HEAD
        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true).remove_ignored(true);
        self.repo.checkout_head(Some(&mut checkout))?;

        debug!(commit = %id, "Hard reset working copy");
        Ok(())
    }

    /// Overwrite `paths` in the index and working tree with their content in
    /// `source`, leaving every other path and HEAD untouched.
    ///
    /// Files under `paths` that do not exist in `source` are removed. A
    /// `source` of `None` stands for the empty tree, which removes `paths`
    /// entirely.
    pub fn restore_paths<P: AsRef<Path>>(
        &self,
        source: Option<CommitId>,
        paths: &[P],
    ) -> Result<(), GitError> {
        let tree = match source {
            Some(id) => self.repo.find_commit(id.oid())?.tree()?,
            None => self.empty_tree()?,
        };

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        for path in paths {
            checkout.path(path.as_ref());
        }

        self.repo.checkout_tree(tree.as_object(), Some(&mut checkout))?;

        debug!(
            source = ?source.map(|id| id.abbreviated()),
            paths = paths.len(),
            "Restored paths"
        );
        Ok(())
    }

    fn empty_tree(&self) -> Result<Tree<'_>, GitError> {
        let oid = self.repo.treebuilder(None)?.write()?;
        Ok(self.repo.find_tree(oid)?)
    }
}
