//! Type profiles, child collections and the shared roster projection

use super::identity::MemberIdentity;
use super::member::{MemberId, MemberStatus, MemberType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Education entry (wholly replaced on edit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub passing_year: i32,
}

/// Career entry (wholly replaced on edit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CareerEntry {
    pub position: String,
    pub organization: String,
    pub joining_year: i32,
    #[serde(default)]
    pub leaving_year: Option<i32>,
}

/// Social-media link (wholly replaced on edit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// Stored award, Director and Professor only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub details: Option<String>,
    pub photo_path: Option<String>,
}

/// Stored document, PhD candidate and Professor only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub document_type: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorDetails {
    pub designation: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorDetails {
    pub designation: String,
    #[serde(default)]
    pub research_interests: Option<String>,
    #[serde(default)]
    pub office_room: Option<String>,
}

/// Shared by PhD and Master's candidates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDetails {
    #[serde(default)]
    pub thesis_title: Option<String>,
    /// Must name an existing Professor
    #[serde(default)]
    pub supervisor_id: Option<MemberId>,
    #[serde(default)]
    pub student_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostdocDetails {
    #[serde(default)]
    pub research_topic: Option<String>,
    /// Must name an existing Professor
    #[serde(default)]
    pub host_professor_id: Option<MemberId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffDetails {
    pub designation: String,
}

/// Role-specific fields, tagged by member type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member_type", rename_all = "snake_case")]
pub enum TypeDetails {
    Director(DirectorDetails),
    Professor(ProfessorDetails),
    PhdCandidate(CandidateDetails),
    MastersCandidate(CandidateDetails),
    PostdocCandidate(PostdocDetails),
    StaffMember(StaffDetails),
}

impl TypeDetails {
    pub const fn member_type(&self) -> MemberType {
        match self {
            Self::Director(_) => MemberType::Director,
            Self::Professor(_) => MemberType::Professor,
            Self::PhdCandidate(_) => MemberType::PhdCandidate,
            Self::MastersCandidate(_) => MemberType::MastersCandidate,
            Self::PostdocCandidate(_) => MemberType::PostdocCandidate,
            Self::StaffMember(_) => MemberType::StaffMember,
        }
    }

    /// Professor referenced by this profile (supervisor or host), if any
    pub fn referenced_professor(&self) -> Option<MemberId> {
        match self {
            Self::PhdCandidate(d) | Self::MastersCandidate(d) => d.supervisor_id,
            Self::PostdocCandidate(d) => d.host_professor_id,
            _ => None,
        }
    }
}

/// Fields every type profile carries
///
/// `start_date`/`end_date` are joining/leaving dates for staff-like types and
/// admission/completion dates for candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub first_name: String,
    pub last_name: String,
    pub primary_email: String,
    #[serde(default)]
    pub other_emails: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub biography: Option<String>,
    pub status: MemberStatus,
    #[serde(default)]
    pub photo_path: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl ProfileFields {
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

/// Authoritative type-specific record of one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProfile {
    pub id: MemberId,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub details: TypeDetails,
    #[serde(skip)]
    pub password_hash: String,
}

/// Full read model: type profile plus every child collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfile {
    #[serde(flatten)]
    pub profile: TypeProfile,
    pub education: Vec<EducationEntry>,
    pub career: Vec<CareerEntry>,
    pub social_links: Vec<SocialLink>,
    pub awards: Vec<Award>,
    pub documents: Vec<Document>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Shared roster row used for login and cross-type listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub id: MemberId,
    pub member_type: MemberType,
    pub first_name: String,
    pub last_name: String,
    pub primary_email: String,
    pub other_emails: Vec<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub status: MemberStatus,
    pub photo_path: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl RosterRow {
    /// Derive the roster row from a type profile
    ///
    /// The roster is never maintained by hand: every write re-derives it
    /// from the profile through this function.
    pub fn project(profile: &TypeProfile) -> Self {
        let f = &profile.fields;
        Self {
            id: profile.id,
            member_type: profile.id.member_type(),
            first_name: f.first_name.clone(),
            last_name: f.last_name.clone(),
            primary_email: f.primary_email.clone(),
            other_emails: f.other_emails.clone(),
            phone: f.phone.clone(),
            id_number: f.id_number.clone(),
            passport_number: f.passport_number.clone(),
            password_hash: profile.password_hash.clone(),
            status: f.status,
            photo_path: f.photo_path.clone(),
            start_date: f.start_date,
            end_date: f.end_date,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Read model returned by member lookups: the roster row next to the
/// authoritative profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub roster: RosterRow,
    pub profile: MemberProfile,
}

impl MemberRecord {
    /// Whether the roster row matches the projection of the type profile
    pub fn is_consistent(&self) -> bool {
        self.roster == RosterRow::project(&self.profile.profile)
    }
}
