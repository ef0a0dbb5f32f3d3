/**
 * Repository Access
 *
 * This module defines the narrow view of the version-control store the
 * annotation store needs, and its implementation on top of `git2`.
 *
 * # Operations
 *
 * - resolve the checked-out branch
 * - check that a commit exists
 * - read the note attached to a commit under a notes ref
 * - enumerate all notes under a notes ref
 * - read a blob by id
 * - read the configured author identity
 * - create or overwrite a note, signed with a given identity and time
 *
 * # Thread Safety
 *
 * `git2::Repository` is `Send` but not `Sync`, so `GitNotes` keeps it behind
 * a `std::sync::Mutex`. All calls are blocking; callers on the async runtime
 * run them through `tokio::task::spawn_blocking`.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset};
use git2::{ErrorCode, Oid, Repository, Signature, Time};

use crate::backend::notes::commit::CommitId;

/// Author identity used to stamp annotations and sign notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// One note under a notes ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    /// Id of the blob holding the note content
    pub note: String,
    /// Commit the note is attached to
    pub target: CommitId,
}

/// Version-control operations used by the annotation store
///
/// Implementations must treat a missing notes ref as "no notes" rather than
/// an error.
pub trait NotesBackend: Send + Sync {
    /// Short name of the checked-out branch, `None` when HEAD is detached
    fn head_branch(&self) -> Result<Option<String>, git2::Error>;

    fn commit_exists(&self, commit: &CommitId) -> Result<bool, git2::Error>;

    /// Content of the note on `commit`, `None` if there is none
    fn read_note(&self, notes_ref: &str, commit: &CommitId) -> Result<Option<Vec<u8>>, git2::Error>;

    /// Every note under `notes_ref`
    fn list_notes(&self, notes_ref: &str) -> Result<Vec<NoteEntry>, git2::Error>;

    fn read_blob(&self, id: &str) -> Result<Vec<u8>, git2::Error>;

    /// Configured author identity (`user.name`, `user.email`)
    fn identity(&self) -> Result<Identity, git2::Error>;

    /// Create or replace the note on `commit`
    fn write_note(
        &self,
        notes_ref: &str,
        commit: &CommitId,
        content: &[u8],
        author: &Identity,
        when: DateTime<FixedOffset>,
    ) -> Result<(), git2::Error>;
}

impl<T: NotesBackend + ?Sized> NotesBackend for Box<T> {
    fn head_branch(&self) -> Result<Option<String>, git2::Error> {
        (**self).head_branch()
    }

    fn commit_exists(&self, commit: &CommitId) -> Result<bool, git2::Error> {
        (**self).commit_exists(commit)
    }

    fn read_note(&self, notes_ref: &str, commit: &CommitId) -> Result<Option<Vec<u8>>, git2::Error> {
        (**self).read_note(notes_ref, commit)
    }

    fn list_notes(&self, notes_ref: &str) -> Result<Vec<NoteEntry>, git2::Error> {
        (**self).list_notes(notes_ref)
    }

    fn read_blob(&self, id: &str) -> Result<Vec<u8>, git2::Error> {
        (**self).read_blob(id)
    }

    fn identity(&self) -> Result<Identity, git2::Error> {
        (**self).identity()
    }

    fn write_note(
        &self,
        notes_ref: &str,
        commit: &CommitId,
        content: &[u8],
        author: &Identity,
        when: DateTime<FixedOffset>,
    ) -> Result<(), git2::Error> {
        (**self).write_note(notes_ref, commit, content, author, when)
    }
}

/// `NotesBackend` backed by a git repository on disk
pub struct GitNotes {
    repo: Mutex<Repository>,
    path: PathBuf,
}

impl GitNotes {
    /// Open the repository containing `path`, searching parent directories
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, git2::Error> {
        let repo = Repository::discover(path)?;
        Ok(Self::from_repository(repo))
    }

    pub fn from_repository(repo: Repository) -> Self {
        let path = repo.path().to_path_buf();
        Self {
            repo: Mutex::new(repo),
            path,
        }
    }

    /// Path of the `.git` directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&Repository) -> Result<T, git2::Error>,
    ) -> Result<T, git2::Error> {
        let repo = self
            .repo
            .lock()
            .map_err(|_| git2::Error::from_str("repository lock poisoned"))?;
        f(&repo)
    }
}

fn not_found_as_none<T>(result: Result<T, git2::Error>) -> Result<Option<T>, git2::Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl NotesBackend for GitNotes {
    fn head_branch(&self) -> Result<Option<String>, git2::Error> {
        self.with_repo(|repo| {
            // Read HEAD without resolving it so unborn branches still have a name.
            let head = repo.find_reference("HEAD")?;
            Ok(head
                .symbolic_target()
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .map(str::to_string))
        })
    }

    fn commit_exists(&self, commit: &CommitId) -> Result<bool, git2::Error> {
        self.with_repo(|repo| {
            not_found_as_none(repo.find_commit(commit.oid())).map(|found| found.is_some())
        })
    }

    fn read_note(&self, notes_ref: &str, commit: &CommitId) -> Result<Option<Vec<u8>>, git2::Error> {
        self.with_repo(|repo| {
            let note = not_found_as_none(repo.find_note(Some(notes_ref), commit.oid()))?;
            Ok(note.map(|note| note.message_bytes().to_vec()))
        })
    }

    fn list_notes(&self, notes_ref: &str) -> Result<Vec<NoteEntry>, git2::Error> {
        self.with_repo(|repo| {
            let notes = match not_found_as_none(repo.notes(Some(notes_ref)))? {
                Some(notes) => notes,
                None => return Ok(Vec::new()),
            };
            notes
                .map(|entry| {
                    entry.map(|(note, target)| NoteEntry {
                        note: note.to_string(),
                        target: CommitId::from_oid(target),
                    })
                })
                .collect()
        })
    }

    fn read_blob(&self, id: &str) -> Result<Vec<u8>, git2::Error> {
        let oid = Oid::from_str(id)?;
        self.with_repo(|repo| Ok(repo.find_blob(oid)?.content().to_vec()))
    }

    fn identity(&self) -> Result<Identity, git2::Error> {
        self.with_repo(|repo| {
            let signature = repo.signature()?;
            Ok(Identity {
                name: String::from_utf8_lossy(signature.name_bytes()).into_owned(),
                email: String::from_utf8_lossy(signature.email_bytes()).into_owned(),
            })
        })
    }

    fn write_note(
        &self,
        notes_ref: &str,
        commit: &CommitId,
        content: &[u8],
        author: &Identity,
        when: DateTime<FixedOffset>,
    ) -> Result<(), git2::Error> {
        let content = std::str::from_utf8(content)
            .map_err(|_| git2::Error::from_str("note content is not valid UTF-8"))?;
        let time = Time::new(when.timestamp(), when.offset().local_minus_utc() / 60);
        let signature = Signature::new(&author.name, &author.email, &time)?;

        self.with_repo(|repo| {
            repo.note(&signature, &signature, Some(notes_ref), commit.oid(), content, true)?;
            Ok(())
        })
    }
}
