//! Annotation Log
//!
//! Review messages are stored as git notes. Each (scope, commit) pair owns
//! one note holding a concatenated frame of messages; appending re-reads
//! the note, appends one message and force-overwrites it.
//!
//! # Module Structure
//!
//! ```text
//! notes/
//! ├── mod.rs          - Module exports and documentation
//! ├── commit.rs       - Commit ids and review scopes
//! ├── repo.rs         - NotesBackend trait and the git2 implementation
//! ├── permit.rs       - Single-writer permit
//! ├── store.rs        - AnnotationStore (list, append)
//! └── handlers.rs     - HTTP handlers
//! ```
//!
//! Scopes follow the checked-out branch: the notes ref is the configured
//! prefix plus `/` plus the branch name, resolved again on every call.

pub mod commit;
pub mod repo;
pub mod permit;
pub mod store;
pub mod handlers;

pub use commit::{CommitId, Scope};
pub use permit::{WriteGate, WritePermit};
pub use repo::{GitNotes, Identity, NoteEntry, NotesBackend};
pub use store::{Annotations, AnnotationStore, AUTHOR_FIELD, DATE_FIELD};
pub use handlers::{get_commit_notes, get_scope, list_notes, post_note, quit};
