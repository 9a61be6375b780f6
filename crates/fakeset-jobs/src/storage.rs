use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::atomic::write_bytes_atomic;
use crate::errors::StorageError;

/// Destination for generated dataset files.
///
/// `write_file` stores the complete content under `name` and returns a
/// reference to it. Writing an existing name replaces its content.
#[async_trait]
pub trait StorageSink: Send + Sync {
    async fn write_file(&self, name: &str, bytes: Vec<u8>) -> Result<String, StorageError>;
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError>;
}

/// Sink backed by process memory; references look like `memory://<name>`.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl StorageSink for InMemoryStorage {
    async fn write_file(&self, name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        check_name(name)?;
        self.files.write().await.insert(name.to_string(), bytes);
        Ok(format!("memory://{name}"))
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}

/// Sink writing each file into one directory; references are file paths.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl StorageSink for FsStorage {
    async fn write_file(&self, name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        check_name(name)?;
        let path = self.root.join(name);
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_bytes_atomic(&target, &bytes))
            .await
            .map_err(|err| StorageError::Task(err.to_string()))??;
        Ok(path.display().to_string())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        check_name(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn check_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("fakeset_storage_{label}_{}", uuid::Uuid::new_v4()));
        dir
    }

    #[tokio::test]
    async fn memory_storage_last_write_wins() {
        let storage = InMemoryStorage::new();
        let uri = storage
            .write_file("a.csv", b"one\n".to_vec())
            .await
            .expect("write");
        assert_eq!(uri, "memory://a.csv");
        storage
            .write_file("a.csv", b"two\n".to_vec())
            .await
            .expect("write");
        assert_eq!(storage.read_file("a.csv").await.expect("read"), b"two\n");
        assert_eq!(storage.names().await, vec!["a.csv".to_string()]);
    }

    #[tokio::test]
    async fn names_with_path_parts_are_rejected() {
        let storage = InMemoryStorage::new();
        for name in ["", "../x.csv", "a/b.csv", ".hidden"] {
            let err = storage
                .write_file(name, Vec::new())
                .await
                .expect_err("invalid name");
            assert!(matches!(err, StorageError::InvalidName(_)), "{name}");
        }
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn fs_storage_writes_under_root() {
        let root = temp_root("fs");
        let storage = FsStorage::new(&root);
        let uri = storage
            .write_file("out.csv", b"n\n1\n".to_vec())
            .await
            .expect("write");
        assert_eq!(PathBuf::from(&uri), root.join("out.csv"));
        assert_eq!(std::fs::read(root.join("out.csv")).expect("read"), b"n\n1\n");
        assert!(matches!(
            storage.read_file("missing.csv").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
