//! Write permits for the annotation log.
//!
//! Appending reads the existing note, appends to it and force-overwrites
//! it. The object store does not serialize that sequence, so every append
//! must hold the process-wide `WritePermit`. `AnnotationStore::append` takes
//! the permit by reference, which makes an unserialized append impossible
//! to write.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out the single write permit
#[derive(Clone, Default)]
pub struct WriteGate {
    lock: Arc<Mutex<()>>,
}

/// Proof that the holder is the only writer; released on drop
///
/// Owned, so it can be moved into a blocking task together with the work
/// it guards.
pub struct WritePermit {
    _guard: OwnedMutexGuard<()>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the write permit
    pub async fn acquire(&self) -> WritePermit {
        WritePermit {
            _guard: self.lock.clone().lock_owned().await,
        }
    }

    /// Take the permit if no one else holds it
    pub fn try_acquire(&self) -> Option<WritePermit> {
        self.lock
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| WritePermit { _guard: guard })
    }
}
