use std::io;
use std::sync::RwLock;

use chirp_types::StoreSnapshot;

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::traits::SnapshotStore;

/// In-memory snapshot store.
///
/// Intended for tests and embedding. Holds the encoded document rather than
/// the decoded value, so every load and save goes through the codec exactly
/// as the file backend does. Starts absent until [`ensure`](SnapshotStore::ensure).
pub struct InMemorySnapshotStore {
    document: RwLock<Option<Vec<u8>>>,
}

impl InMemorySnapshotStore {
    /// Create a store with no document.
    pub fn new() -> Self {
        Self {
            document: RwLock::new(None),
        }
    }

    /// Create a store already holding an empty snapshot.
    pub fn initialized() -> StoreResult<Self> {
        let store = Self::new();
        store.ensure()?;
        Ok(store)
    }

    /// A copy of the raw encoded document, if any.
    pub fn raw_document(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self
            .document
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone())
    }

    /// Replace the raw document, bypassing the codec.
    pub fn replace_raw_document(&self, bytes: Option<Vec<u8>>) -> StoreResult<()> {
        *self.document.write().map_err(|_| StoreError::LockPoisoned)? = bytes;
        Ok(())
    }
}

fn decode_present(document: &Option<Vec<u8>>) -> StoreResult<StoreSnapshot> {
    match document {
        Some(bytes) => codec::decode(bytes),
        None => Err(StoreError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "snapshot document does not exist",
        ))),
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> StoreResult<StoreSnapshot> {
        let document = self.document.read().map_err(|_| StoreError::LockPoisoned)?;
        decode_present(&document)
    }

    fn save(&self, snapshot: &StoreSnapshot) -> StoreResult<()> {
        let bytes = codec::encode(snapshot)?;
        *self.document.write().map_err(|_| StoreError::LockPoisoned)? = Some(bytes);
        Ok(())
    }

    fn ensure(&self) -> StoreResult<()> {
        let mut document = self.document.write().map_err(|_| StoreError::LockPoisoned)?;
        if document.is_none() {
            *document = Some(codec::encode(&StoreSnapshot::empty())?);
        }
        Ok(())
    }

    fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut document = self
            .document
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut snapshot = decode_present(&document)?;
        let value = mutate(&mut snapshot)?;
        *document = Some(codec::encode(&snapshot)?);
        Ok(value)
    }
}

impl std::fmt::Debug for InMemorySnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self
            .document
            .read()
            .ok()
            .and_then(|doc| doc.as_ref().map(Vec::len));
        f.debug_struct("InMemorySnapshotStore")
            .field("document_bytes", &size)
            .finish()
    }
}
