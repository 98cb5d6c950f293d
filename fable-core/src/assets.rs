//! Object storage abstraction for illustrations and narration audio
//!
//! Uploads return a durable URL string; the inline-data to URL transition on
//! a page is best-effort and owned by the store.

use crate::error::AssetError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use uuid::Uuid;

/// Result type for asset operations
pub type AssetResult<T> = std::result::Result<T, AssetError>;

/// Abstract asset storage provider
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store a page illustration, returning its durable URL
    async fn upload_image(&self, data: &[u8], book_id: Uuid, page_id: Uuid)
        -> AssetResult<String>;

    /// Delete a page illustration
    async fn delete_image(&self, book_id: Uuid, page_id: Uuid) -> AssetResult<()>;

    /// Store a page narration clip, returning its durable URL
    async fn upload_audio(&self, data: &[u8], book_id: Uuid, page_id: Uuid)
        -> AssetResult<String>;

    /// Delete a page narration clip
    async fn delete_audio(&self, book_id: Uuid, page_id: Uuid) -> AssetResult<()>;
}

/// Local filesystem asset store
pub struct LocalAssets {
    root: PathBuf,
}

impl LocalAssets {
    /// Create a new local asset store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn asset_path(&self, kind: &str, book_id: Uuid, page_id: Uuid) -> PathBuf {
        self.root
            .join(kind)
            .join(book_id.to_string())
            .join(page_id.to_string())
    }

    async fn write(&self, path: &PathBuf, data: &[u8]) -> AssetResult<String> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AssetError::Backend(e.to_string()))?;
        }
        tokio::fs::write(path, data)
            .await
            .map_err(|e| AssetError::Backend(e.to_string()))?;
        Ok(path.display().to_string())
    }

    async fn remove(&self, path: &PathBuf) -> AssetResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| AssetError::NotFound(e.to_string()))
    }
}

#[async_trait]
impl AssetStore for LocalAssets {
    async fn upload_image(
        &self,
        data: &[u8],
        book_id: Uuid,
        page_id: Uuid,
    ) -> AssetResult<String> {
        self.write(&self.asset_path("images", book_id, page_id), data)
            .await
    }

    async fn delete_image(&self, book_id: Uuid, page_id: Uuid) -> AssetResult<()> {
        self.remove(&self.asset_path("images", book_id, page_id))
            .await
    }

    async fn upload_audio(
        &self,
        data: &[u8],
        book_id: Uuid,
        page_id: Uuid,
    ) -> AssetResult<String> {
        self.write(&self.asset_path("audio", book_id, page_id), data)
            .await
    }

    async fn delete_audio(&self, book_id: Uuid, page_id: Uuid) -> AssetResult<()> {
        self.remove(&self.asset_path("audio", book_id, page_id))
            .await
    }
}

/// In-memory asset store (for testing)
#[derive(Default)]
pub struct MemoryAssets {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: &str, book_id: Uuid, page_id: Uuid) -> String {
        format!("{kind}/{book_id}/{page_id}")
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Whether the store holds no assets
    pub fn is_empty(&self) -> bool {
        self.data.read().unwrap().is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssets {
    async fn upload_image(
        &self,
        data: &[u8],
        book_id: Uuid,
        page_id: Uuid,
    ) -> AssetResult<String> {
        let key = Self::key("images", book_id, page_id);
        self.data.write().unwrap().insert(key.clone(), data.to_vec());
        Ok(format!("memory://{key}"))
    }

    async fn delete_image(&self, book_id: Uuid, page_id: Uuid) -> AssetResult<()> {
        let key = Self::key("images", book_id, page_id);
        self.data
            .write()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or(AssetError::NotFound(key))
    }

    async fn upload_audio(
        &self,
        data: &[u8],
        book_id: Uuid,
        page_id: Uuid,
    ) -> AssetResult<String> {
        let key = Self::key("audio", book_id, page_id);
        self.data.write().unwrap().insert(key.clone(), data.to_vec());
        Ok(format!("memory://{key}"))
    }

    async fn delete_audio(&self, book_id: Uuid, page_id: Uuid) -> AssetResult<()> {
        let key = Self::key("audio", book_id, page_id);
        self.data
            .write()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or(AssetError::NotFound(key))
    }
}
