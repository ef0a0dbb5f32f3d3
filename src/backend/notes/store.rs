/**
 * Annotation Store
 *
 * This module maps commits to their ordered review messages. Messages for
 * one commit live in a single note under the current scope
 * (`<prefix>/<branch>`), as a concatenation of encoded message frames.
 *
 * # Append Protocol
 *
 * 1. Validate the commit id (before touching the repository)
 * 2. Resolve the scope from the checked-out branch
 * 3. Read and decode the existing note; absence means an empty log
 * 4. Stamp the new message with `Author` and `Date`
 * 5. Append its encoding after the existing bytes
 * 6. Force-write the note, replacing the previous one
 *
 * Nothing in the object store serializes steps 3-6, so `append` requires a
 * `WritePermit`. Any failure before step 6 leaves the existing note intact.
 *
 * # Reading
 *
 * `list_all` decodes every note in the scope. A single malformed note
 * fails the whole listing so history is never shown incomplete.
 */

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local};

use crate::backend::error::BackendError;
use crate::backend::notes::commit::{CommitId, Scope};
use crate::backend::notes::permit::WritePermit;
use crate::backend::notes::repo::NotesBackend;
use crate::shared::message::{decode_frame, Header, Message};

/// Field stamped with the repository identity on append
pub const AUTHOR_FIELD: &str = "Author";

/// Field stamped with the append time (RFC 2822) on append
pub const DATE_FIELD: &str = "Date";

/// Review messages grouped by commit, each list in append order
pub type Annotations = BTreeMap<CommitId, Vec<Message>>;

/// Read-append-overwrite store of review messages
pub struct AnnotationStore<B> {
    backend: B,
    prefix: String,
}

impl<B: NotesBackend> AnnotationStore<B> {
    /// Create a store writing under `prefix` (e.g. `refs/notes/scrutinize`)
    pub fn new(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve the current scope from the checked-out branch
    pub fn scope(&self) -> Result<Scope, BackendError> {
        match self.backend.head_branch() {
            Ok(Some(branch)) => Ok(Scope::new(&self.prefix, &branch)),
            Ok(None) => Err(BackendError::scope_unavailable(
                "HEAD is not on a branch; check out a branch to review",
            )),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read HEAD");
                Err(BackendError::scope_unavailable("cannot read HEAD"))
            }
        }
    }

    /// Every review message in the current scope, grouped by commit
    pub fn list_all(&self) -> Result<Annotations, BackendError> {
        let scope = self.scope()?;
        let entries = self
            .backend
            .list_notes(scope.notes_ref())
            .map_err(|e| BackendError::store_io("list", scope.notes_ref(), None, e))?;

        let mut annotations = Annotations::new();
        for entry in entries {
            let frame = self.backend.read_blob(&entry.note).map_err(|e| {
                BackendError::store_io("read", scope.notes_ref(), Some(entry.target.to_string()), e)
            })?;
            let messages = decode_frame(&frame).map_err(|source| BackendError::Format {
                scope: scope.notes_ref().to_string(),
                object: entry.note.clone(),
                source,
            })?;
            annotations.entry(entry.target).or_default().extend(messages);
        }

        tracing::debug!(
            scope = %scope,
            commits = annotations.len(),
            messages = annotations.values().map(Vec::len).sum::<usize>(),
            "listed annotations"
        );
        Ok(annotations)
    }

    /// Review messages of one commit in the current scope
    pub fn list(&self, commit: &str) -> Result<Vec<Message>, BackendError> {
        let commit = CommitId::parse(commit)?;
        let scope = self.scope()?;
        self.read_existing(&scope, &commit)
            .map(|existing| existing.map(|(_, messages)| messages).unwrap_or_default())
    }

    /// Append a review message to a commit
    ///
    /// `Author` and `Date` supplied by the caller are discarded and replaced
    /// with the repository identity and the current time.
    ///
    /// # Returns
    ///
    /// The message as stored, read back from its encoding, so header
    /// values are line-normalized exactly as later listings return them.
    ///
    /// # Errors
    ///
    /// - `InvalidReference` if `commit` is not a valid commit id; nothing is read or written
    /// - `ScopeUnavailable` if no branch is checked out
    /// - `CommitNotFound` if the commit does not exist
    /// - `Format` if the existing note cannot be decoded; it is left untouched
    /// - `StoreIo` if reading or writing the note fails
    pub fn append(
        &self,
        _permit: &WritePermit,
        commit: &str,
        mut fields: Header,
        body: impl Into<String>,
    ) -> Result<Message, BackendError> {
        let commit = CommitId::parse(commit)?;
        let scope = self.scope()?;

        for reserved in [AUTHOR_FIELD, DATE_FIELD] {
            if let Some(values) = fields.remove(reserved) {
                tracing::debug!(field = reserved, ?values, "discarding caller-supplied field");
            }
        }

        let exists = self.backend.commit_exists(&commit).map_err(|e| {
            BackendError::store_io("read", scope.notes_ref(), Some(commit.to_string()), e)
        })?;
        if !exists {
            return Err(BackendError::CommitNotFound {
                commit: commit.to_string(),
            });
        }

        let mut frame = match self.read_existing(&scope, &commit)? {
            Some((bytes, _)) => bytes,
            None => Vec::new(),
        };

        let author = self.backend.identity().map_err(|e| {
            BackendError::store_io("stamp", scope.notes_ref(), Some(commit.to_string()), e)
        })?;
        let now: DateTime<FixedOffset> = Local::now().fixed_offset();
        fields.set(AUTHOR_FIELD, author.to_string())?;
        fields.set(DATE_FIELD, now.to_rfc2822())?;
        let message = Message::new(fields, body);
        let encoded = message.encode();

        frame.extend_from_slice(&encoded);

        self.backend
            .write_note(scope.notes_ref(), &commit, &frame, &author, now)
            .map_err(|e| {
                BackendError::store_io("write", scope.notes_ref(), Some(commit.to_string()), e)
            })?;

        tracing::info!(scope = %scope, commit = %commit, author = %author, "appended annotation");
        Ok(Message::read_from(&mut encoded.as_slice())?.unwrap_or(message))
    }

    /// Read and decode the note on `commit`, keeping the raw bytes
    fn read_existing(
        &self,
        scope: &Scope,
        commit: &CommitId,
    ) -> Result<Option<(Vec<u8>, Vec<Message>)>, BackendError> {
        let bytes = self
            .backend
            .read_note(scope.notes_ref(), commit)
            .map_err(|e| {
                BackendError::store_io("read", scope.notes_ref(), Some(commit.to_string()), e)
            })?;

        match bytes {
            None => Ok(None),
            Some(bytes) => {
                let messages = decode_frame(&bytes).map_err(|source| BackendError::Format {
                    scope: scope.notes_ref().to_string(),
                    object: format!("{}:{}", scope.notes_ref(), commit),
                    source,
                })?;
                Ok(Some((bytes, messages)))
            }
        }
    }
}
