//! Blob storage for member photos, award photos and documents
//!
//! Files land under `<root>/<member_type>/<owner>/<slot>-<uuid>.<ext>` and
//! the registry keeps the path relative to `<root>`.

use async_trait::async_trait;
use image::ImageFormat;
use shared::models::MemberType;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Accepted document extensions
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "webp", "doc", "docx", "txt"];

/// Uploaded file as received from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Original file name, used for the document extension
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedAsset {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }
}

/// What an asset is stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSlot {
    Photo,
    AwardPhoto,
    Document,
}

impl AssetSlot {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::AwardPhoto => "award",
            Self::Document => "document",
        }
    }

    const fn is_image(&self) -> bool {
        matches!(self, Self::Photo | Self::AwardPhoto)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("empty upload")]
    Empty,

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("invalid stored path: {0}")]
    InvalidPath(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// The upload itself was unacceptable (as opposed to a storage failure)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::TooLarge { .. } | Self::Unsupported(_)
        )
    }
}

/// Save a blob, get back a path; delete by path
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn store(
        &self,
        member_type: MemberType,
        owner: &str,
        slot: AssetSlot,
        asset: &UploadedAsset,
    ) -> Result<String, StorageError>;

    /// Move a stored blob under another owner of the same member type
    async fn relocate(&self, path: &str, owner: &str) -> Result<String, StorageError>;

    /// Deleting a path that no longer exists succeeds
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// Local filesystem storage
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored relative path
    pub fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Drop the owner directory once its last file is gone
    async fn prune_owner_dir(&self, file: &Path) {
        if let Some(dir) = file.parent()
            && dir != self.root
        {
            // Fails while the directory still holds files
            let _ = tokio::fs::remove_dir(dir).await;
        }
    }

    /// Extension to store the asset under, after content checks
    fn checked_extension(&self, slot: AssetSlot, asset: &UploadedAsset) -> Result<String, StorageError> {
        if asset.bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if asset.bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                size: asset.bytes.len(),
                max: self.max_bytes,
            });
        }

        if slot.is_image() {
            // Trust the content, not the file name
            let format = image::guess_format(&asset.bytes)
                .map_err(|_| StorageError::Unsupported(asset.file_name.clone()))?;
            return match format {
                ImageFormat::Png => Ok("png".into()),
                ImageFormat::Jpeg => Ok("jpg".into()),
                ImageFormat::WebP => Ok("webp".into()),
                other => Err(StorageError::Unsupported(format!("{other:?}"))),
            };
        }

        match asset.extension() {
            Some(ext) if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
            _ => Err(StorageError::Unsupported(asset.file_name.clone())),
        }
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn store(
        &self,
        member_type: MemberType,
        owner: &str,
        slot: AssetSlot,
        asset: &UploadedAsset,
    ) -> Result<String, StorageError> {
        let ext = self.checked_extension(slot, asset)?;
        let relative = format!(
            "{}/{}/{}-{}.{}",
            member_type.as_str(),
            owner,
            slot.as_str(),
            Uuid::new_v4(),
            ext
        );
        let target = self.resolve(&relative)?;
        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&target, &asset.bytes).await?;

        tracing::debug!(path = %relative, size = asset.bytes.len(), "Stored asset");
        Ok(relative)
    }

    async fn relocate(&self, path: &str, owner: &str) -> Result<String, StorageError> {
        let mut parts = path.split('/');
        let (Some(member_type), Some(_), Some(file), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(StorageError::InvalidPath(path.to_string()));
        };
        let relative = format!("{member_type}/{owner}/{file}");

        let source = self.resolve(path)?;
        let target = self.resolve(&relative)?;
        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::rename(&source, &target).await?;
        self.prune_owner_dir(&source).await;

        tracing::debug!(from = %path, to = %relative, "Relocated asset");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                self.prune_owner_dir(&target).await;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
