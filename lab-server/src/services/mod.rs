//! Registry collaborators
//!
//! - [`storage`] - blob storage for photos and documents
//! - [`credential`] - password hashing
//! - [`notifier`] - best-effort notification delivery

pub mod credential;
pub mod notifier;
pub mod storage;

pub use credential::{Argon2Hasher, CredentialError, CredentialHasher};
pub use notifier::{LogEmitter, NotificationEmitter, NotifyError, WebhookEmitter};
pub use storage::{AssetSlot, BlobStorage, LocalBlobStorage, StorageError, UploadedAsset};
