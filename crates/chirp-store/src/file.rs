use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chirp_types::StoreSnapshot;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::traits::SnapshotStore;

/// A snapshot store backed by a single JSON file.
///
/// Saves write a temporary file in the same directory and rename it over the
/// target, so a crash or a concurrent reader never sees a half-written
/// document. The lock serializes access within this process only.
pub struct FileSnapshotStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSnapshotStore {
    /// Create a store for `path` without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Create a store for `path` and make sure the document exists.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(path);
        store.ensure()?;
        Ok(store)
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_guard(&self) -> StoreResult<RwLockReadGuard<'_, ()>> {
        self.lock.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_guard(&self) -> StoreResult<RwLockWriteGuard<'_, ()>> {
        self.lock.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    // Callers must hold the lock.
    fn read_document(&self) -> StoreResult<StoreSnapshot> {
        let bytes = fs::read(&self.path)?;
        let snapshot = codec::decode(&bytes)?;
        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            records = snapshot.record_count(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    // Callers must hold the write lock.
    fn write_document(&self, snapshot: &StoreSnapshot) -> StoreResult<()> {
        let bytes = codec::encode(snapshot)?;
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            records = snapshot.record_count(),
            "saved snapshot"
        );
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> StoreResult<StoreSnapshot> {
        let _guard = self.read_guard()?;
        self.read_document()
    }

    fn save(&self, snapshot: &StoreSnapshot) -> StoreResult<()> {
        let _guard = self.write_guard()?;
        self.write_document(snapshot)
    }

    fn ensure(&self) -> StoreResult<()> {
        let _guard = self.write_guard()?;
        if self.path.exists() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "creating empty snapshot");
        self.write_document(&StoreSnapshot::empty())
    }

    fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_guard()?;
        let mut snapshot = self.read_document()?;
        let value = mutate(&mut snapshot)?;
        self.write_document(&snapshot)?;
        Ok(value)
    }
}

impl std::fmt::Debug for FileSnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSnapshotStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_types::{Post, PostId, UserId};
    use std::sync::Arc;
    use std::thread;

    fn temp_store() -> (tempfile::TempDir, FileSnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path().join("database.json")).unwrap();
        (dir, store)
    }

    fn post(id: PostId, body: &str) -> Post {
        Post {
            id,
            author_id: UserId::new(1),
            body: body.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    #[test]
    fn open_creates_empty_document() {
        let (_dir, store) = temp_store();
        assert!(store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn ensure_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("a/b/database.json"));
        store.ensure().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn ensure_is_idempotent_and_keeps_data() {
        let (_dir, store) = temp_store();
        let mut snap = store.load().unwrap();
        let id = snap.allocate_post_id().unwrap();
        snap.posts.insert(id, post(id, "keep me"));
        store.save(&snap).unwrap();

        store.ensure().unwrap();
        assert_eq!(store.load().unwrap(), snap);
    }

    #[test]
    fn missing_document_after_init_is_io_error() {
        let (_dir, store) = temp_store();
        fs::remove_file(store.path()).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Io(_))));
    }

    // -----------------------------------------------------------------------
    // Load / save
    // -----------------------------------------------------------------------

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = temp_store();
        let mut snap = StoreSnapshot::empty();
        let id = snap.allocate_post_id().unwrap();
        snap.posts.insert(id, post(id, "hello"));
        store.save(&snap).unwrap();
        assert_eq!(store.load().unwrap(), snap);
    }

    #[test]
    fn save_of_load_preserves_document() {
        let (_dir, store) = temp_store();
        let mut snap = StoreSnapshot::empty();
        let id = snap.allocate_post_id().unwrap();
        snap.posts.insert(id, post(id, "x"));
        store.save(&snap).unwrap();

        let before = store.load().unwrap();
        store.save(&before).unwrap();
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn external_modification_is_visible() {
        let (_dir, store) = temp_store();
        store.load().unwrap();
        fs::write(
            store.path(),
            br#"{"posts":{"9":{"id":9,"author_id":1,"body":"outside"}}}"#,
        )
        .unwrap();
        let snap = store.load().unwrap();
        assert_eq!(snap.posts[&PostId::new(9)].body, "outside");
    }

    #[test]
    fn corrupt_document_is_codec_error() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), b"{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Codec(_))));
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let (dir, store) = temp_store();
        store.save(&StoreSnapshot::empty()).unwrap();
        store.save(&StoreSnapshot::empty()).unwrap();
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn reset_empties_document() {
        let (_dir, store) = temp_store();
        store
            .update(|snap| {
                let id = snap.allocate_post_id().unwrap();
                snap.posts.insert(id, post(id, "gone soon"));
                Ok::<_, StoreError>(())
            })
            .unwrap();
        store.reset().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    #[test]
    fn failed_update_writes_nothing() {
        let (_dir, store) = temp_store();
        let before = fs::read(store.path()).unwrap();
        let result: Result<(), StoreError> = store.update(|snap| {
            let id = snap.allocate_post_id().unwrap();
            snap.posts.insert(id, post(id, "never saved"));
            Err(StoreError::Codec("rejected".into()))
        });
        assert!(result.is_err());
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .update(|snap| {
                            let id = snap.allocate_post_id().unwrap();
                            snap.posts.insert(id, post(id, &format!("t{i}")));
                            Ok::<_, StoreError>(id)
                        })
                        .unwrap()
                })
            })
            .collect();
        let mut ids: Vec<PostId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.load().unwrap().posts.len(), 16);
    }

    #[test]
    fn concurrent_readers_see_whole_documents() {
        let (_dir, store) = temp_store();
        let store = Arc::new(store);
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..20 {
                    store
                        .update(|snap| {
                            let id = snap.allocate_post_id().unwrap();
                            snap.posts.insert(id, post(id, "w"));
                            Ok::<_, StoreError>(())
                        })
                        .unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..20 {
                        let snap = store.load().unwrap();
                        assert_eq!(snap.posts.len() as u64, snap.last_post_id);
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(store.load().unwrap().posts.len(), 20);
    }
}
