//! Local persistence of fetched fragments.

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::data::FragmentIndex;
use crate::error::{FetchError, Result};

/// Write-once storage for fragment bodies, keyed by index.
///
/// Fragments arrive in any order from concurrent tasks. A second `put` for an
/// index already stored is a logic error and returns
/// [`FetchError::DuplicateFragment`].
pub trait FragmentStore: Send + Sync {
    fn put(&self, index: FragmentIndex, bytes: Bytes) -> impl Future<Output = Result<()>> + Send;
}

/// Stores each fragment as its own file inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Use `dir` for fragment files. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding fragment `index`.
    pub fn fragment_path(&self, index: FragmentIndex) -> PathBuf {
        self.dir.join(format!("{index:010}.frag"))
    }

    /// Concatenate fragments `0..count` in index order into `output`.
    ///
    /// Refuses to touch an existing `output`. Returns the number of bytes
    /// written. On error the partially written output is left in place.
    pub async fn assemble(&self, count: u64, output: &Path) -> Result<u64> {
        let output_err = |source: io::Error| FetchError::Output {
            path: output.to_path_buf(),
            source,
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(output).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(FetchError::OutputExists(output.to_path_buf()));
            }
            Err(e) => return Err(output_err(e)),
        };

        let mut written = 0u64;
        for index in 0..count {
            let body = fs::read(self.fragment_path(index))
                .await
                .map_err(|source| FetchError::Store { index, source })?;
            file.write_all(&body).await.map_err(output_err)?;
            written += body.len() as u64;
        }

        file.flush().await.map_err(output_err)?;
        file.sync_all().await.map_err(output_err)?;
        debug!(count, written, output = %output.display(), "assembled fragments");
        Ok(written)
    }
}

impl FragmentStore for DirStore {
    async fn put(&self, index: FragmentIndex, bytes: Bytes) -> Result<()> {
        let path = self.fragment_path(index);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(FetchError::DuplicateFragment(index));
            }
            Err(source) => return Err(FetchError::Store { index, source }),
        };

        file.write_all(&bytes)
            .await
            .map_err(|source| FetchError::Store { index, source })?;
        file.flush()
            .await
            .map_err(|source| FetchError::Store { index, source })?;
        Ok(())
    }
}

/// Keeps fragments in memory. Useful for tests and for callers that stream
/// the result elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    fragments: Mutex<BTreeMap<FragmentIndex, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: FragmentIndex) -> Option<Bytes> {
        self.lock().get(&index).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stored indices in ascending order.
    pub fn indices(&self) -> Vec<FragmentIndex> {
        self.lock().keys().copied().collect()
    }

    /// Concatenate fragments `0..count` in index order.
    pub fn assemble(&self, count: u64) -> Result<Vec<u8>> {
        let fragments = self.lock();
        let mut out = Vec::new();
        for index in 0..count {
            let body = fragments.get(&index).ok_or_else(|| FetchError::Store {
                index,
                source: io::Error::new(io::ErrorKind::NotFound, "fragment not stored"),
            })?;
            out.extend_from_slice(body);
        }
        Ok(out)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<FragmentIndex, Bytes>> {
        self.fragments.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FragmentStore for MemoryStore {
    async fn put(&self, index: FragmentIndex, bytes: Bytes) -> Result<()> {
        let mut fragments = self.lock();
        if fragments.contains_key(&index) {
            return Err(FetchError::DuplicateFragment(index));
        }
        fragments.insert(index, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_dir_store_put_and_assemble() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(dir.path());
        // out of order on purpose
        store.put(2, Bytes::from_static(b"cc")).await.unwrap();
        store.put(0, Bytes::from_static(b"a")).await.unwrap();
        store.put(1, Bytes::from_static(b"bbb")).await.unwrap();

        let output = dir.path().join("out.ts");
        let written = store.assemble(3, &output).await.unwrap();
        assert_eq!(written, 6);
        assert_eq!(std::fs::read(&output).unwrap(), b"abbbcc");
    }

    #[tokio::test]
    async fn test_dir_store_rejects_duplicate() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(dir.path());
        store.put(5, Bytes::from_static(b"x")).await.unwrap();
        let err = store.put(5, Bytes::from_static(b"y")).await.unwrap_err();
        assert!(matches!(err, FetchError::DuplicateFragment(5)));
        assert_eq!(std::fs::read(store.fragment_path(5)).unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_assemble_refuses_existing_output() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(dir.path());
        let output = dir.path().join("out.ts");
        std::fs::write(&output, b"keep me").unwrap();

        let err = store.assemble(0, &output).await.unwrap_err();
        assert!(matches!(err, FetchError::OutputExists(_)));
        assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn test_assemble_missing_fragment() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(dir.path());
        store.put(0, Bytes::from_static(b"a")).await.unwrap();

        let err = store.assemble(2, &dir.path().join("out.ts")).await.unwrap_err();
        assert!(matches!(err, FetchError::Store { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_assemble_zero_fragments() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(dir.path());
        let output = dir.path().join("empty.ts");
        assert_eq!(store.assemble(0, &output).await.unwrap(), 0);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.put(1, Bytes::from_static(b"world")).await.unwrap();
        store.put(0, Bytes::from_static(b"hello ")).await.unwrap();
        assert!(store.put(1, Bytes::new()).await.is_err());

        assert_eq!(store.len(), 2);
        assert_eq!(store.indices(), vec![0, 1]);
        assert_eq!(store.assemble(2).unwrap(), b"hello world");
        assert!(store.assemble(3).is_err());
    }
}
