//! Commit identifiers and review scopes.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::backend::error::BackendError;

/// Length of a hex-encoded SHA-1 object id
const OID_HEX_LEN: usize = 40;

/// A syntactically valid commit identifier
///
/// Exactly 40 hexadecimal characters, stored lower-cased. Whether the
/// commit exists is a separate question answered by the repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(String);

impl CommitId {
    /// Validate and normalize a commit identifier
    ///
    /// # Errors
    ///
    /// `BackendError::InvalidReference` if `value` is not 40 hex characters.
    pub fn parse(value: &str) -> Result<Self, BackendError> {
        if value.len() != OID_HEX_LEN || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BackendError::invalid_reference(value));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn oid(&self) -> git2::Oid {
        // Already validated as 40 hex digits.
        git2::Oid::from_str(&self.0).unwrap_or_else(|_| git2::Oid::zero())
    }

    pub(crate) fn from_oid(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

impl FromStr for CommitId {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CommitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// The notes ref annotations are read from and written to
///
/// Made of the configured prefix and the checked-out branch, e.g.
/// `refs/notes/scrutinize/feature-x`, so each branch has its own log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    notes_ref: String,
    branch: String,
}

impl Scope {
    pub fn new(prefix: &str, branch: &str) -> Self {
        Self {
            notes_ref: format!("{}/{}", prefix.trim_end_matches('/'), branch),
            branch: branch.to_string(),
        }
    }

    /// Full notes ref name
    pub fn notes_ref(&self) -> &str {
        &self.notes_ref
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notes_ref)
    }
}
