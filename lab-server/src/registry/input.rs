//! Registry operation inputs

use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{
    CareerEntry, EducationEntry, MemberIdentity, MemberStatus, MemberType, SocialLink,
    TypeDetails,
};

use crate::services::UploadedAsset;

/// Award to append; the photo is stored before the write transaction
#[derive(Debug, Clone)]
pub struct NewAward {
    pub title: String,
    pub year: i32,
    pub details: Option<String>,
    pub photo: Option<UploadedAsset>,
}

/// Document to append
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub document_type: String,
    pub file: UploadedAsset,
}

/// Input of `create_member`
///
/// The member type is the tag of `details`.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub primary_email: String,
    pub other_emails: Vec<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub biography: Option<String>,
    /// Defaults to the type's default status
    pub status: Option<MemberStatus>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub details: TypeDetails,
    pub photo: Option<UploadedAsset>,
    pub education: Vec<EducationEntry>,
    pub career: Vec<CareerEntry>,
    pub social_links: Vec<SocialLink>,
    pub awards: Vec<NewAward>,
    pub documents: Vec<NewDocument>,
}

impl NewMember {
    pub fn member_type(&self) -> MemberType {
        self.details.member_type()
    }

    pub fn identity(&self) -> MemberIdentity {
        MemberIdentity {
            primary_email: Some(self.primary_email.clone()),
            other_emails: self.other_emails.clone(),
            phone: self.phone.clone(),
            id_number: self.id_number.clone(),
            passport_number: self.passport_number.clone(),
        }
    }
}

/// Input of `update_member`
///
/// `None` leaves a field untouched. Education, career and social links are
/// replaced wholesale when `Some` (an empty list clears them); awards and
/// documents are only ever appended, and documents can be removed by id.
/// The primary email cannot change.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub other_emails: Option<Vec<String>>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    pub password: Option<String>,
    pub biography: Option<String>,
    pub status: Option<MemberStatus>,
    pub end_date: Option<NaiveDate>,
    pub details: Option<TypeDetails>,
    pub photo: Option<UploadedAsset>,
    pub education: Option<Vec<EducationEntry>>,
    pub career: Option<Vec<CareerEntry>>,
    pub social_links: Option<Vec<SocialLink>>,
    pub new_awards: Vec<NewAward>,
    pub new_documents: Vec<NewDocument>,
    pub remove_documents: Vec<i64>,
}

impl MemberPatch {
    /// Identity fields supplied by this patch, for the uniqueness guard
    pub fn identity(&self) -> MemberIdentity {
        MemberIdentity {
            primary_email: None,
            other_emails: self.other_emails.clone().unwrap_or_default(),
            phone: self.phone.clone(),
            id_number: self.id_number.clone(),
            passport_number: self.passport_number.clone(),
        }
    }
}

/// Roster listing filter
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RosterFilter {
    pub member_type: Option<MemberType>,
    pub status: Option<MemberStatus>,
}
