//! Profile updater (edit)

use shared::models::{MemberId, RosterRow, TypeProfile};
use shared::util::{non_empty, now_millis, today};

use super::descriptor::{TypeDescriptor, descriptor};
use super::error::{RegistryError, RegistryResult};
use super::input::MemberPatch;
use super::validation::validate_patch;
use super::{
    MemberRegistry, StagedAssets, conflict_or_clear, ensure_professor, guard, touch_roster,
};
use crate::db::repository::{member as member_repo, notification as notification_repo};

/// What a committed patch leaves behind for cleanup
struct PatchOutcome {
    title: String,
    /// Replaced photo and removed document files
    superseded: Vec<String>,
}

impl MemberRegistry {
    /// Apply a patch to an existing member
    ///
    /// The patch is validated (including the password policy) before any
    /// I/O. Shared fields are written to the type row and the roster row
    /// together; collections follow replace or append semantics per
    /// [`MemberPatch`].
    pub async fn update_member(&self, id: MemberId, patch: MemberPatch) -> RegistryResult<()> {
        let desc = descriptor(id.member_type());
        let mut patch = validate_patch(desc, patch, today())?;

        let password_hash = match patch.password.take() {
            Some(password) => Some(
                self.hash_secret(password)
                    .await
                    .map_err(RegistryError::UpdateFailed)?,
            ),
            None => None,
        };

        let staged = self
            .stage_assets(
                desc.member_type,
                &id.to_string(),
                patch.photo.as_ref(),
                &patch.new_awards,
                &patch.new_documents,
            )
            .await?;

        match self.apply_patch(desc, id, &patch, password_hash, &staged).await {
            Ok(outcome) => {
                tracing::info!(member_id = %id, member_type = %desc.member_type, "Member updated");
                self.discard_assets(&outcome.superseded).await;
                self.notify(id, outcome.title).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(member_id = %id, error = %err, "Member update rejected");
                self.discard_assets(&staged.paths()).await;
                Err(err)
            }
        }
    }

    async fn apply_patch(
        &self,
        desc: &TypeDescriptor,
        id: MemberId,
        patch: &MemberPatch,
        password_hash: Option<String>,
        staged: &StagedAssets,
    ) -> RegistryResult<PatchOutcome> {
        let now = now_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RegistryError::UpdateFailed(e.to_string()))?;

        touch_roster(&mut tx, id, now).await?;
        let mut profile = member_repo::find_profile(&mut tx, desc, id)
            .await
            .map_err(RegistryError::from_update)?
            .ok_or(RegistryError::NotFound(id))?;

        let mut superseded = merge(&mut profile, patch, password_hash, staged)?;

        let identity = patch.identity();
        if !identity.is_empty() {
            conflict_or_clear(guard::check_conflicts(&mut tx, &identity, Some(id)).await?)?;
        }
        if let Some(details) = &patch.details {
            ensure_professor(&mut tx, details, RegistryError::from_update).await?;
        }

        member_repo::update_profile(&mut tx, desc, &profile, now)
            .await
            .map_err(RegistryError::from_update)?;
        member_repo::update_roster(&mut tx, &RosterRow::project(&profile), now)
            .await
            .map_err(RegistryError::from_update)?;

        if let Some(education) = &patch.education {
            member_repo::replace_education(&mut tx, desc, id, education)
                .await
                .map_err(RegistryError::from_update)?;
        }
        if let Some(career) = &patch.career {
            member_repo::replace_career(&mut tx, desc, id, career)
                .await
                .map_err(RegistryError::from_update)?;
        }
        if let Some(links) = &patch.social_links {
            member_repo::replace_social_links(&mut tx, desc, id, links)
                .await
                .map_err(RegistryError::from_update)?;
        }

        for (award, photo) in patch.new_awards.iter().zip(&staged.award_photos) {
            member_repo::insert_award(
                &mut tx,
                desc,
                id,
                &award.title,
                award.year,
                award.details.as_deref(),
                photo.as_deref(),
                now,
            )
            .await
            .map_err(RegistryError::from_update)?;
        }
        for (document, path) in patch.new_documents.iter().zip(&staged.documents) {
            member_repo::insert_document(
                &mut tx,
                desc,
                id,
                &document.title,
                &document.document_type,
                path,
                now,
            )
            .await
            .map_err(RegistryError::from_update)?;
        }

        for &document_id in &patch.remove_documents {
            let document = member_repo::find_document(&mut tx, desc, id, document_id)
                .await
                .map_err(RegistryError::from_update)?
                .ok_or(RegistryError::DocumentNotFound {
                    member_id: id,
                    document_id,
                })?;
            member_repo::delete_document(&mut tx, desc, id, document_id)
                .await
                .map_err(RegistryError::from_update)?;
            superseded.push(document.file_path);
        }

        let title = format!("{} {id} profile updated", desc.member_type.label());
        notification_repo::insert(&mut tx, id, &title, now)
            .await
            .map_err(RegistryError::from_update)?;

        tx.commit()
            .await
            .map_err(|e| RegistryError::UpdateFailed(e.to_string()))?;
        Ok(PatchOutcome { title, superseded })
    }
}

/// Fold a validated patch into the stored profile
///
/// Returns the replaced photo path, if any. Rules that need the stored
/// profile are checked here: a secondary email may not equal the member's
/// own primary email, and an end date alone cannot be set on an active
/// member.
fn merge(
    profile: &mut TypeProfile,
    patch: &MemberPatch,
    password_hash: Option<String>,
    staged: &StagedAssets,
) -> RegistryResult<Vec<String>> {
    let f = &mut profile.fields;

    if let Some(first_name) = &patch.first_name {
        f.first_name = first_name.clone();
    }
    if let Some(last_name) = &patch.last_name {
        f.last_name = last_name.clone();
    }
    if let Some(others) = &patch.other_emails {
        if others.contains(&f.primary_email) {
            return Err(RegistryError::validation(
                "other_emails",
                format!("'{}' is already the primary email", f.primary_email),
            ));
        }
        f.other_emails = others.clone();
    }
    if let Some(phone) = &patch.phone {
        f.phone = Some(phone.clone());
    }
    if let Some(id_number) = &patch.id_number {
        f.id_number = Some(id_number.clone());
    }
    if let Some(passport) = &patch.passport_number {
        f.passport_number = Some(passport.clone());
    }
    if let Some(biography) = &patch.biography {
        f.biography = non_empty(Some(biography));
    }

    match patch.status {
        Some(status) => {
            f.status = status;
            f.end_date = if status.is_ended() { patch.end_date } else { None };
        }
        None => {
            if let Some(end_date) = patch.end_date {
                if !f.status.is_ended() {
                    return Err(RegistryError::validation(
                        "end_date",
                        format!("cannot be set while status is '{}'", f.status),
                    ));
                }
                f.end_date = Some(end_date);
            }
        }
    }
    if let Some(end_date) = f.end_date
        && end_date < f.start_date
    {
        return Err(RegistryError::validation(
            "end_date",
            "must not be before the start date",
        ));
    }

    let mut superseded = Vec::new();
    if let Some(photo) = &staged.photo
        && let Some(old) = f.photo_path.replace(photo.clone())
    {
        superseded.push(old);
    }

    if let Some(details) = &patch.details {
        profile.details = details.clone();
    }
    if let Some(hash) = password_hash {
        profile.password_hash = hash;
    }
    Ok(superseded)
}
