//! # legitest-git
//!
//! Typed git operations for the legitest commit verifier.
//!
//! All access to version control goes through [`GitClient`], a thin wrapper
//! over a libgit2 repository handle. Each operation takes explicit arguments
//! and returns a [`GitError`] on failure; nothing is built from shell strings
//! and nothing reads the process working directory.
//!
//! ## Key Types
//!
//! - [`GitClient`] - `clone_into`, `resolve`, `parent`, `changed_files`,
//!   `reset_hard`, `restore_paths`
//! - [`CommitId`] - Canonical commit identifier
//! - [`GitError`] - Failure of a git operation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use legitest_git::GitClient;
//!
//! let git = GitClient::clone_into(repo_root, scratch_dir)?;
//! let id = git.resolve("main~1")?;
//!
//! git.reset_hard(id)?;
//! git.restore_paths(git.parent(id)?, &["src"])?;
//! ```

mod client;
mod commit;

pub use client::{GitClient, GitError};
pub use commit::{CommitId, ABBREV_LEN};
