//! Member registry engine
//!
//! One generic engine over the six member types, parameterized by
//! [`descriptor::TypeDescriptor`]. Every mutation runs in a single SQLite
//! transaction that starts with a write, so identifier issuance, the
//! uniqueness re-check and all inserts happen under the writer lock.
//! Blob storage runs before the transaction and notification delivery after
//! the commit; neither holds a connection.

pub mod descriptor;
pub mod error;
pub mod input;
pub mod validation;

mod guard;
mod id_gen;
mod updater;
mod writer;

pub use error::{RegistryError, RegistryResult};
pub use input::{MemberPatch, NewAward, NewDocument, NewMember, RosterFilter};

use shared::models::{
    ConflictReport, MemberId, MemberIdentity, MemberRecord, MemberStatus, MemberType,
    Notification, NotificationEvent, NotificationStatus, RosterRow,
};
use shared::util::{normalize_email, now_millis};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;

use crate::db::repository::{RepoError, member as member_repo, notification as notification_repo};
use crate::services::{AssetSlot, BlobStorage, CredentialHasher, NotificationEmitter, UploadedAsset};
use descriptor::descriptor;

/// Paths written to blob storage ahead of a transaction
#[derive(Debug, Default)]
pub(crate) struct StagedAssets {
    pub photo: Option<String>,
    /// Aligned with the award inputs
    pub award_photos: Vec<Option<String>>,
    /// Aligned with the document inputs
    pub documents: Vec<String>,
}

impl StagedAssets {
    fn paths(&self) -> Vec<String> {
        self.photo
            .iter()
            .chain(self.award_photos.iter().flatten())
            .chain(self.documents.iter())
            .cloned()
            .collect()
    }
}

#[derive(Clone)]
pub struct MemberRegistry {
    pool: SqlitePool,
    storage: Arc<dyn BlobStorage>,
    hasher: Arc<dyn CredentialHasher>,
    emitter: Arc<dyn NotificationEmitter>,
}

impl MemberRegistry {
    pub fn new(
        pool: SqlitePool,
        storage: Arc<dyn BlobStorage>,
        hasher: Arc<dyn CredentialHasher>,
        emitter: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            pool,
            storage,
            hasher,
            emitter,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ── Read side ───────────────────────────────────────────────────

    /// Run the uniqueness guard outside any write
    pub async fn check_conflicts(
        &self,
        candidate: &MemberIdentity,
        exclude: Option<MemberId>,
    ) -> RegistryResult<ConflictReport> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RegistryError::GuardUnavailable(e.to_string()))?;
        guard::check_conflicts(&mut conn, candidate, exclude).await
    }

    /// Id the next successful create of `member_type` would receive
    pub async fn peek_next_id(&self, member_type: MemberType) -> RegistryResult<MemberId> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RegistryError::GenerationFailed(e.to_string()))?;
        id_gen::peek_next_id(&mut conn, descriptor(member_type)).await
    }

    pub async fn get_member(&self, id: MemberId) -> RegistryResult<MemberRecord> {
        let desc = descriptor(id.member_type());
        let mut conn = self.acquire().await?;
        let profile = member_repo::find_member(&mut conn, desc, id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;
        let roster = member_repo::find_roster(&mut conn, id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;
        Ok(MemberRecord { roster, profile })
    }

    pub async fn list_roster(&self, filter: RosterFilter) -> RegistryResult<Vec<RosterRow>> {
        let mut conn = self.acquire().await?;
        let rows = member_repo::list_roster(&mut conn, filter.member_type, filter.status).await?;
        Ok(rows)
    }

    /// Check a login against the shared roster
    ///
    /// Unknown email and wrong password are indistinguishable. Only a
    /// correct password reveals that an account is disabled.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> RegistryResult<RosterRow> {
        let email = normalize_email(email);
        let mut conn = self.acquire().await?;
        let row = member_repo::find_roster_by_email(&mut conn, &email)
            .await?
            .ok_or(RegistryError::InvalidCredentials)?;
        drop(conn);

        let hasher = Arc::clone(&self.hasher);
        let secret = password.to_string();
        let digest = row.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || hasher.verify(&secret, &digest))
            .await
            .map_err(|e| RegistryError::Database(format!("verify task failed: {e}")))?;

        if !valid {
            tracing::warn!(email = %email, "Login rejected");
            return Err(RegistryError::InvalidCredentials);
        }
        if row.status == MemberStatus::Inactive {
            return Err(RegistryError::AccountDisabled(row.id));
        }
        tracing::info!(member_id = %row.id, "Login succeeded");
        Ok(row)
    }

    pub async fn list_notifications(
        &self,
        member_id: Option<MemberId>,
        unread_only: bool,
    ) -> RegistryResult<Vec<Notification>> {
        let mut conn = self.acquire().await?;
        Ok(notification_repo::list(&mut conn, member_id, unread_only).await?)
    }

    pub async fn mark_notification_read(&self, id: i64) -> RegistryResult<Notification> {
        let mut conn = self.acquire().await?;
        notification_repo::mark_read(&mut conn, id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => RegistryError::NotificationNotFound(id),
                e => e.into(),
            })
    }

    // ── Shared helpers for the writer and updater ───────────────────

    async fn acquire(&self) -> RegistryResult<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| RegistryError::Database(e.to_string()))
    }

    /// Hash on the blocking pool; the error string is wrapped by the caller
    async fn hash_secret(&self, secret: String) -> Result<String, String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| format!("hash task failed: {e}"))?
            .map_err(|e| e.to_string())
    }

    async fn store_asset(
        &self,
        member_type: MemberType,
        owner: &str,
        slot: AssetSlot,
        asset: &UploadedAsset,
        field: &str,
    ) -> RegistryResult<String> {
        self.storage
            .store(member_type, owner, slot, asset)
            .await
            .map_err(|e| {
                if e.is_rejection() {
                    RegistryError::validation(field, e.to_string())
                } else {
                    RegistryError::AssetStoreFailed(e.to_string())
                }
            })
    }

    /// Store every uploaded asset of a request
    ///
    /// On failure the assets already stored are removed again.
    async fn stage_assets(
        &self,
        member_type: MemberType,
        owner: &str,
        photo: Option<&UploadedAsset>,
        awards: &[NewAward],
        documents: &[NewDocument],
    ) -> RegistryResult<StagedAssets> {
        let mut staged = StagedAssets::default();
        let result = self
            .stage_into(&mut staged, member_type, owner, photo, awards, documents)
            .await;
        if let Err(err) = result {
            self.discard_assets(&staged.paths()).await;
            return Err(err);
        }
        Ok(staged)
    }

    async fn stage_into(
        &self,
        staged: &mut StagedAssets,
        member_type: MemberType,
        owner: &str,
        photo: Option<&UploadedAsset>,
        awards: &[NewAward],
        documents: &[NewDocument],
    ) -> RegistryResult<()> {
        if let Some(photo) = photo {
            staged.photo = Some(
                self.store_asset(member_type, owner, AssetSlot::Photo, photo, "photo")
                    .await?,
            );
        }
        for award in awards {
            let path = match &award.photo {
                Some(photo) => Some(
                    self.store_asset(member_type, owner, AssetSlot::AwardPhoto, photo, "awards.photo")
                        .await?,
                ),
                None => None,
            };
            staged.award_photos.push(path);
        }
        for document in documents {
            staged.documents.push(
                self.store_asset(
                    member_type,
                    owner,
                    AssetSlot::Document,
                    &document.file,
                    "documents.file",
                )
                .await?,
            );
        }
        Ok(())
    }

    /// Move staged uploads under their final owner, updating paths in place
    /// so a failure leaves `staged` naming wherever each file currently is
    async fn relocate_assets(&self, staged: &mut StagedAssets, owner: &str) -> RegistryResult<()> {
        let paths = staged
            .photo
            .iter_mut()
            .chain(staged.award_photos.iter_mut().flatten())
            .chain(staged.documents.iter_mut());
        for path in paths {
            let moved = self
                .storage
                .relocate(path, owner)
                .await
                .map_err(|e| RegistryError::AssetStoreFailed(e.to_string()))?;
            *path = moved;
        }
        Ok(())
    }

    /// Best-effort removal of stored blobs
    async fn discard_assets(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.delete(path).await {
                tracing::warn!(path = %path, error = %e, "Failed to remove stored asset");
            }
        }
    }

    /// Deliver a notification event after commit; failures are logged only
    async fn notify(&self, member_id: MemberId, title: String) {
        let event = NotificationEvent {
            member_id,
            title,
            status: NotificationStatus::Unread,
        };
        if let Err(e) = self.emitter.emit(&event).await {
            tracing::warn!(member_id = %member_id, error = %e, "Notification delivery failed");
        }
    }

    /// Remove one document and its stored file
    pub async fn delete_document(&self, member_id: MemberId, document_id: i64) -> RegistryResult<()> {
        let desc = descriptor(member_id.member_type());
        if !desc.has_documents() {
            return Err(RegistryError::validation(
                "document_id",
                format!("a {} has no documents", desc.member_type.label()),
            ));
        }

        let now = now_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RegistryError::UpdateFailed(e.to_string()))?;
        touch_roster(&mut tx, member_id, now).await?;

        let document = member_repo::find_document(&mut tx, desc, member_id, document_id)
            .await
            .map_err(RegistryError::from_update)?
            .ok_or(RegistryError::DocumentNotFound {
                member_id,
                document_id,
            })?;
        member_repo::delete_document(&mut tx, desc, member_id, document_id)
            .await
            .map_err(RegistryError::from_update)?;

        let title = format!("{} {member_id} document removed", desc.member_type.label());
        notification_repo::insert(&mut tx, member_id, &title, now)
            .await
            .map_err(RegistryError::from_update)?;
        tx.commit()
            .await
            .map_err(|e| RegistryError::UpdateFailed(e.to_string()))?;

        tracing::info!(member_id = %member_id, document_id, "Document removed");
        self.discard_assets(&[document.file_path]).await;
        self.notify(member_id, title).await;
        Ok(())
    }
}

/// Take the writer lock on an existing member's roster row
async fn touch_roster(conn: &mut SqliteConnection, id: MemberId, now: i64) -> RegistryResult<()> {
    member_repo::touch_roster(conn, id, now)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => RegistryError::NotFound(id),
            e => RegistryError::from_update(e),
        })
}

/// Supervisor and host references must name a stored Professor
async fn ensure_professor(
    conn: &mut SqliteConnection,
    details: &shared::models::TypeDetails,
    on_error: fn(RepoError) -> RegistryError,
) -> RegistryResult<()> {
    let Some(professor) = details.referenced_professor() else {
        return Ok(());
    };
    let exists = member_repo::profile_exists(conn, descriptor(MemberType::Professor), professor)
        .await
        .map_err(on_error)?;
    if !exists {
        let field = match details.member_type() {
            MemberType::PostdocCandidate => "host_professor_id",
            _ => "supervisor_id",
        };
        return Err(RegistryError::validation(
            field,
            format!("professor {professor} does not exist"),
        ));
    }
    Ok(())
}

fn conflict_or_clear(report: ConflictReport) -> RegistryResult<()> {
    if report.is_clear() {
        Ok(())
    } else {
        Err(RegistryError::ConflictDetected(report))
    }
}
