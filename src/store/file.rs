//! File-backed persistent store.
//!
//! One directory per cache name, one file per key. Writes go through a
//! temporary file and a rename so a record is always either the old or
//! the new bytes, never a torn write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::{Store, StoreError, StoreFactory};

/// Persistent store rooted at a single directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store over `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(sanitize(key))
    }
}

/// Map a store key to a filesystem-safe file name. Alphanumerics, `-`
/// and `_` pass through; anything else becomes `%XX`.
fn sanitize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[async_trait]
impl Store for FileStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &value).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::StorageFull
                || e.kind() == std::io::ErrorKind::QuotaExceeded
            {
                StoreError::QuotaExceeded
            } else {
                StoreError::Io(e.to_string())
            }
        })?;
        tokio::fs::rename(&tmp, &path).await?;
        trace!(key, bytes = value.len(), "store write");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}

/// Opens one [`FileStore`] directory per cache name.
///
/// Defaults to `<platform cache dir>/muninn/<name>`; a custom root can be
/// supplied for tests or relocated deployments.
pub struct FileStoreFactory {
    root: Option<PathBuf>,
}

impl FileStoreFactory {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn root_dir(&self) -> Result<PathBuf, StoreError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::cache_dir()
            .map(|d| d.join("muninn"))
            .ok_or_else(|| StoreError::Io("no platform cache directory".into()))
    }
}

impl Default for FileStoreFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFactory for FileStoreFactory {
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError> {
        let dir = self.root_dir()?.join(sanitize(name));
        Ok(Arc::new(FileStore::open(dir)?))
    }
}

impl FileStore {
    /// Directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_escapes_reserved_characters() {
        assert_eq!(sanitize("p12"), "p12");
        assert_eq!(sanitize("__muninn"), "__muninn");
        assert_eq!(sanitize("a/b c"), "a%2Fb%20c");
    }

    #[tokio::test]
    async fn roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.write("p0", b"records".to_vec()).await.unwrap();
        assert_eq!(store.read("p0").await.unwrap().unwrap(), b"records");

        store.clear().await.unwrap();
        assert!(store.read("p0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.remove("nope").await.unwrap();
    }

    #[tokio::test]
    async fn factory_reopens_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FileStoreFactory::with_root(dir.path());

        let a = factory.open("cache-a").unwrap();
        a.write("k", b"v".to_vec()).await.unwrap();

        let b = factory.open("cache-a").unwrap();
        assert_eq!(b.read("k").await.unwrap().unwrap(), b"v");
    }
}
