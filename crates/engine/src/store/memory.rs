use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use super::{BlobError, BlobStore, RemoteFile, VersionToken};

/// In-memory [`BlobStore`] with the same versioning rules as the remote.
///
/// Used by tests. It can inject a one-shot failure and can
/// yield to the scheduler once per call, which makes overlapping calls
/// observable on a single-threaded runtime.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    state: Mutex<MemoryState>,
    yield_calls: AtomicBool,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<String, StoredFile>,
    next_version: u64,
    writes: usize,
    fail_next_read: Option<BlobError>,
    fail_next_write: Option<BlobError>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    version: VersionToken,
    message: String,
}

impl MemoryState {
    fn bump(&mut self) -> VersionToken {
        self.next_version += 1;
        VersionToken::new(format!("v{}", self.next_version))
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one file.
    pub fn with_file(path: &str, content: &str) -> Self {
        let store = Self::new();
        store.overwrite(path, content);
        store
    }

    /// Makes every call yield once before touching the state.
    #[must_use]
    pub fn yielding(self) -> Self {
        self.yield_calls.store(true, Ordering::SeqCst);
        self
    }

    /// Replaces a file out of band, as another writer would.
    pub fn overwrite(&self, path: &str, content: &str) -> VersionToken {
        let mut state = self.lock();
        let version = state.bump();
        state.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                version: version.clone(),
                message: String::new(),
            },
        );
        version
    }

    /// Makes the next read fail with `err`.
    pub fn fail_next_read(&self, err: BlobError) {
        self.lock().fail_next_read = Some(err);
    }

    /// Makes the next write fail with `err`, leaving the file untouched.
    pub fn fail_next_write(&self, err: BlobError) {
        self.lock().fail_next_write = Some(err);
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|file| file.content.clone())
    }

    pub fn version(&self, path: &str) -> Option<VersionToken> {
        self.lock().files.get(path).map(|file| file.version.clone())
    }

    pub fn last_message(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|file| file.message.clone())
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn maybe_yield(&self) {
        if self.yield_calls.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }
}

impl BlobStore for MemoryBlobStore {
    async fn read(&self, path: &str) -> Result<Option<RemoteFile>, BlobError> {
        self.maybe_yield().await;
        let mut state = self.lock();
        if let Some(err) = state.fail_next_read.take() {
            return Err(err);
        }
        Ok(state.files.get(path).map(|file| RemoteFile {
            path: path.to_string(),
            content: file.content.clone(),
            version: file.version.clone(),
        }))
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        message: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, BlobError> {
        self.maybe_yield().await;
        let mut state = self.lock();
        if let Some(err) = state.fail_next_write.take() {
            return Err(err);
        }

        let current = state.files.get(path).map(|file| &file.version);
        if current != expected {
            return Err(BlobError::Conflict(format!(
                "{path} does not match {}",
                expected.map_or("a new file", VersionToken::as_str)
            )));
        }

        let version = state.bump();
        state.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                version: version.clone(),
                message: message.to_string(),
            },
        );
        state.writes += 1;
        Ok(version)
    }
}
