use chirp_types::StoreSnapshot;

use crate::error::{StoreError, StoreResult};

/// Whole-document snapshot storage.
///
/// All implementations must satisfy these invariants:
/// - `load` re-reads the backing medium on every call.
/// - `save` replaces the document in full; readers never observe a partial write.
/// - A document that is missing after [`ensure`](Self::ensure) is an I/O error,
///   not an empty snapshot.
/// - Errors are propagated to the caller and never retried.
pub trait SnapshotStore: Send + Sync {
    /// Read and decode the whole document under a shared lock.
    fn load(&self) -> StoreResult<StoreSnapshot>;

    /// Encode and overwrite the whole document under an exclusive lock.
    ///
    /// Two callers doing `load` then `save` concurrently race; the last save
    /// wins. Use [`update`](Self::update) for read-modify-write.
    fn save(&self, snapshot: &StoreSnapshot) -> StoreResult<()>;

    /// Create the document with an empty snapshot if it does not exist.
    ///
    /// Idempotent: an existing document is left untouched.
    fn ensure(&self) -> StoreResult<()>;

    /// Overwrite the document with an empty snapshot.
    fn reset(&self) -> StoreResult<()> {
        self.save(&StoreSnapshot::empty())
    }

    /// Load, apply `mutate`, and save, all under one exclusive lock.
    ///
    /// If `mutate` returns `Err` the document is not written.
    fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut StoreSnapshot) -> Result<T, E>,
        E: From<StoreError>;
}
