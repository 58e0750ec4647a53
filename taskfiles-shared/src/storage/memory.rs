/// In-process blob store
///
/// Keeps objects in a `BTreeMap` behind a tokio `RwLock`, so listings come
/// back in key order. Selected with `BLOB_BACKEND=memory`; contents vanish
/// with the process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{BlobItem, BlobObject, BlobStore, StorageError};

#[derive(Debug, Default)]
struct Container {
    exists: bool,
    objects: BTreeMap<String, BlobObject>,
}

/// [`BlobStore`] backed by process memory
#[derive(Debug)]
pub struct MemoryBlobStore {
    name: String,
    inner: RwLock<Container>,
}

impl MemoryBlobStore {
    /// Creates a store whose container already exists
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            name: container.into(),
            inner: RwLock::new(Container {
                exists: true,
                objects: BTreeMap::new(),
            }),
        }
    }

    /// Creates a store whose container has not been created yet
    pub fn without_container(container: impl Into<String>) -> Self {
        Self {
            name: container.into(),
            inner: RwLock::new(Container::default()),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.inner.read().await.objects.len()
    }

    /// Whether the container holds no objects
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether an object exists under `key`
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.objects.contains_key(key)
    }

    fn missing_container(&self) -> StorageError {
        StorageError::ContainerNotFound(self.name.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn container(&self) -> &str {
        &self.name
    }

    async fn container_exists(&self) -> Result<bool, StorageError> {
        Ok(self.inner.read().await.exists)
    }

    async fn create_container_if_missing(&self) -> Result<bool, StorageError> {
        let mut inner = self.inner.write().await;
        let created = !inner.exists;
        inner.exists = true;
        Ok(created)
    }

    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.exists {
            return Err(self.missing_container());
        }

        inner.objects.insert(
            key.to_string(),
            BlobObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<BlobObject, StorageError> {
        let inner = self.inner.read().await;
        if !inner.exists {
            return Err(self.missing_container());
        }

        inner
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete_if_exists(&self, key: &str) -> Result<bool, StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.exists {
            return Err(self.missing_container());
        }

        Ok(inner.objects.remove(key).is_some())
    }

    async fn list(&self) -> Result<Vec<BlobItem>, StorageError> {
        let inner = self.inner.read().await;
        if !inner.exists {
            return Err(self.missing_container());
        }

        Ok(inner
            .objects
            .iter()
            .map(|(key, object)| BlobItem {
                key: key.clone(),
                size: i64::try_from(object.data.len()).ok(),
            })
            .collect())
    }

    async fn copy(&self, source: &str, destination: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if !inner.exists {
            return Err(self.missing_container());
        }

        let object = inner
            .objects
            .get(source)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(source.to_string()))?;
        inner.objects.insert(destination.to_string(), object);
        Ok(())
    }
}
