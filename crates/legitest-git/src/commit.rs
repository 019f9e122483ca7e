use git2::Oid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the abbreviated form used in per-commit report lines
pub const ABBREV_LEN: usize = 10;

/// Canonical identifier of a commit, resolved from a user-supplied reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CommitId(Oid);

impl CommitId {
    pub fn oid(&self) -> Oid {
        self.0
    }

    /// First [`ABBREV_LEN`] hex characters of the id
    pub fn abbreviated(&self) -> String {
        let mut hex = self.0.to_string();
        hex.truncate(ABBREV_LEN);
        hex
    }
}

impl From<Oid> for CommitId {
    fn from(oid: Oid) -> Self {
        Self(oid)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0.to_string()
    }
}

impl TryFrom<String> for CommitId {
    type Error = git2::Error;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        Oid::from_str(&hex).map(Self)
    }
}

impl std::str::FromStr for CommitId {
    type Err = git2::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Oid::from_str(s).map(Self)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
