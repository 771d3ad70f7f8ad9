//! Profile writer (create)

use shared::models::{MemberId, ProfileFields, RosterRow, TypeProfile};
use shared::util::{now_millis, today};
use uuid::Uuid;

use super::descriptor::{TypeDescriptor, descriptor};
use super::error::{RegistryError, RegistryResult};
use super::input::NewMember;
use super::validation::validate_new_member;
use super::{MemberRegistry, StagedAssets, conflict_or_clear, ensure_professor, guard, id_gen};
use crate::db::repository::{member as member_repo, notification as notification_repo};

impl MemberRegistry {
    /// Register a new member and return its identifier
    ///
    /// Order: validate, guard (fail fast), hash, store uploads under a
    /// staging owner, then one transaction that issues the id, re-runs the
    /// guard, moves the uploads under the new id, and writes the type row,
    /// roster row, children and notification. Uploads are removed again if
    /// the transaction fails.
    pub async fn create_member(&self, input: NewMember) -> RegistryResult<MemberId> {
        let desc = descriptor(input.member_type());
        let mut input = validate_new_member(desc, input, today())?;

        conflict_or_clear(self.check_conflicts(&input.identity(), None).await?)?;

        let password_hash = self
            .hash_secret(std::mem::take(&mut input.password))
            .await
            .map_err(RegistryError::WriteFailed)?;

        let staging_owner = format!("staging-{}", Uuid::new_v4());
        let mut staged = self
            .stage_assets(
                desc.member_type,
                &staging_owner,
                input.photo.as_ref(),
                &input.awards,
                &input.documents,
            )
            .await?;

        match self
            .insert_member(desc, &input, password_hash, &mut staged)
            .await
        {
            Ok((id, title)) => {
                tracing::info!(
                    member_id = %id,
                    member_type = %desc.member_type,
                    "Member created"
                );
                self.notify(id, title).await;
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(
                    member_type = %desc.member_type,
                    error = %err,
                    "Member create rejected"
                );
                self.discard_assets(&staged.paths()).await;
                Err(err)
            }
        }
    }

    async fn insert_member(
        &self,
        desc: &TypeDescriptor,
        input: &NewMember,
        password_hash: String,
        staged: &mut StagedAssets,
    ) -> RegistryResult<(MemberId, String)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RegistryError::WriteFailed(e.to_string()))?;

        let id = id_gen::next_id(&mut tx, desc).await?;
        conflict_or_clear(guard::check_conflicts(&mut tx, &input.identity(), None).await?)?;
        ensure_professor(&mut tx, &input.details, RegistryError::from_write).await?;
        self.relocate_assets(staged, &id.to_string()).await?;

        let now = now_millis();
        let profile = TypeProfile {
            id,
            fields: ProfileFields {
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                primary_email: input.primary_email.clone(),
                other_emails: input.other_emails.clone(),
                phone: input.phone.clone(),
                id_number: input.id_number.clone(),
                passport_number: input.passport_number.clone(),
                date_of_birth: input.date_of_birth,
                biography: input.biography.clone(),
                status: input.status.unwrap_or(desc.default_status),
                photo_path: staged.photo.clone(),
                start_date: input.start_date,
                end_date: input.end_date,
            },
            details: input.details.clone(),
            password_hash,
        };

        member_repo::insert_profile(&mut tx, desc, &profile, now)
            .await
            .map_err(RegistryError::from_write)?;
        member_repo::insert_roster(&mut tx, &RosterRow::project(&profile), now)
            .await
            .map_err(RegistryError::from_write)?;

        member_repo::replace_education(&mut tx, desc, id, &input.education)
            .await
            .map_err(RegistryError::from_write)?;
        member_repo::replace_career(&mut tx, desc, id, &input.career)
            .await
            .map_err(RegistryError::from_write)?;
        member_repo::replace_social_links(&mut tx, desc, id, &input.social_links)
            .await
            .map_err(RegistryError::from_write)?;

        for (award, photo) in input.awards.iter().zip(&staged.award_photos) {
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
            .map_err(RegistryError::from_write)?;
        }
        for (document, path) in input.documents.iter().zip(&staged.documents) {
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
            .map_err(RegistryError::from_write)?;
        }

        let title = format!("{} {id} registered", desc.member_type.label());
        notification_repo::insert(&mut tx, id, &title, now)
            .await
            .map_err(RegistryError::from_write)?;

        tx.commit()
            .await
            .map_err(|e| RegistryError::WriteFailed(e.to_string()))?;
        Ok((id, title))
    }
}
