//! Per-type descriptors
//!
//! One static [`TypeDescriptor`] per [`MemberType`] names its tables, date
//! columns, role-specific columns, status vocabulary and which child
//! collections it owns. The engine is written once against this table.

use shared::models::{
    CandidateDetails, DirectorDetails, MemberId, MemberStatus, MemberType, PostdocDetails,
    ProfessorDetails, StaffDetails, TypeDetails,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

#[derive(Debug)]
pub struct TypeDescriptor {
    pub member_type: MemberType,
    pub table: &'static str,
    /// Joining or admission date column
    pub start_column: &'static str,
    /// Leaving or completion date column
    pub end_column: &'static str,
    pub statuses: &'static [MemberStatus],
    pub default_status: MemberStatus,
    /// Role-specific columns, in [`TypeDescriptor::detail_values`] order
    pub extra_columns: &'static [&'static str],
    pub education_table: &'static str,
    pub career_table: &'static str,
    pub social_table: &'static str,
    pub award_table: Option<&'static str>,
    pub document_table: Option<&'static str>,
}

const STAFF_STATUSES: &[MemberStatus] = &[MemberStatus::Active, MemberStatus::Inactive];
const PROFESSOR_STATUSES: &[MemberStatus] = &[
    MemberStatus::Active,
    MemberStatus::Inactive,
    MemberStatus::Emeritus,
];
const CANDIDATE_STATUSES: &[MemberStatus] = &[
    MemberStatus::Active,
    MemberStatus::Graduated,
    MemberStatus::Inactive,
];
const POSTDOC_STATUSES: &[MemberStatus] = &[
    MemberStatus::Active,
    MemberStatus::Alumni,
    MemberStatus::Inactive,
];

const CANDIDATE_COLUMNS: &[&str] = &["thesis_title", "supervisor_id", "student_number"];

static DIRECTOR: TypeDescriptor = TypeDescriptor {
    member_type: MemberType::Director,
    table: "directors",
    start_column: "joining_date",
    end_column: "leaving_date",
    statuses: STAFF_STATUSES,
    default_status: MemberStatus::Active,
    extra_columns: &["designation", "message"],
    education_table: "directors_education",
    career_table: "directors_career",
    social_table: "directors_social_links",
    award_table: Some("directors_awards"),
    document_table: None,
};

static PROFESSOR: TypeDescriptor = TypeDescriptor {
    member_type: MemberType::Professor,
    table: "professors",
    start_column: "joining_date",
    end_column: "leaving_date",
    statuses: PROFESSOR_STATUSES,
    default_status: MemberStatus::Active,
    extra_columns: &["designation", "research_interests", "office_room"],
    education_table: "professors_education",
    career_table: "professors_career",
    social_table: "professors_social_links",
    award_table: Some("professors_awards"),
    document_table: Some("professors_documents"),
};

static PHD_CANDIDATE: TypeDescriptor = TypeDescriptor {
    member_type: MemberType::PhdCandidate,
    table: "phd_candidates",
    start_column: "admission_date",
    end_column: "completion_date",
    statuses: CANDIDATE_STATUSES,
    default_status: MemberStatus::Active,
    extra_columns: CANDIDATE_COLUMNS,
    education_table: "phd_candidates_education",
    career_table: "phd_candidates_career",
    social_table: "phd_candidates_social_links",
    award_table: None,
    document_table: Some("phd_candidates_documents"),
};

static MASTERS_CANDIDATE: TypeDescriptor = TypeDescriptor {
    member_type: MemberType::MastersCandidate,
    table: "masters_candidates",
    start_column: "admission_date",
    end_column: "completion_date",
    statuses: CANDIDATE_STATUSES,
    default_status: MemberStatus::Active,
    extra_columns: CANDIDATE_COLUMNS,
    education_table: "masters_candidates_education",
    career_table: "masters_candidates_career",
    social_table: "masters_candidates_social_links",
    award_table: None,
    document_table: None,
};

static POSTDOC_CANDIDATE: TypeDescriptor = TypeDescriptor {
    member_type: MemberType::PostdocCandidate,
    table: "postdoc_candidates",
    start_column: "admission_date",
    end_column: "completion_date",
    statuses: POSTDOC_STATUSES,
    default_status: MemberStatus::Active,
    extra_columns: &["research_topic", "host_professor_id"],
    education_table: "postdoc_candidates_education",
    career_table: "postdoc_candidates_career",
    social_table: "postdoc_candidates_social_links",
    award_table: None,
    document_table: None,
};

static STAFF_MEMBER: TypeDescriptor = TypeDescriptor {
    member_type: MemberType::StaffMember,
    table: "staff_members",
    start_column: "joining_date",
    end_column: "leaving_date",
    statuses: STAFF_STATUSES,
    default_status: MemberStatus::Active,
    extra_columns: &["designation"],
    education_table: "staff_members_education",
    career_table: "staff_members_career",
    social_table: "staff_members_social_links",
    award_table: None,
    document_table: None,
};

/// Descriptor for a member type
pub fn descriptor(member_type: MemberType) -> &'static TypeDescriptor {
    match member_type {
        MemberType::Director => &DIRECTOR,
        MemberType::Professor => &PROFESSOR,
        MemberType::PhdCandidate => &PHD_CANDIDATE,
        MemberType::MastersCandidate => &MASTERS_CANDIDATE,
        MemberType::PostdocCandidate => &POSTDOC_CANDIDATE,
        MemberType::StaffMember => &STAFF_MEMBER,
    }
}

/// Every descriptor, in [`MemberType::ALL`] order
pub fn all() -> impl Iterator<Item = &'static TypeDescriptor> {
    MemberType::ALL.into_iter().map(descriptor)
}

impl TypeDescriptor {
    pub fn allows_status(&self, status: MemberStatus) -> bool {
        self.statuses.contains(&status)
    }

    pub fn has_awards(&self) -> bool {
        self.award_table.is_some()
    }

    pub fn has_documents(&self) -> bool {
        self.document_table.is_some()
    }

    /// Role-specific column values, aligned with `extra_columns`
    pub fn detail_values(&self, details: &TypeDetails) -> Vec<Option<String>> {
        let id = |v: &Option<MemberId>| v.map(|id| id.to_string());
        match details {
            TypeDetails::Director(d) => vec![Some(d.designation.clone()), d.message.clone()],
            TypeDetails::Professor(d) => vec![
                Some(d.designation.clone()),
                d.research_interests.clone(),
                d.office_room.clone(),
            ],
            TypeDetails::PhdCandidate(d) | TypeDetails::MastersCandidate(d) => vec![
                d.thesis_title.clone(),
                id(&d.supervisor_id),
                d.student_number.clone(),
            ],
            TypeDetails::PostdocCandidate(d) => {
                vec![d.research_topic.clone(), id(&d.host_professor_id)]
            }
            TypeDetails::StaffMember(d) => vec![Some(d.designation.clone())],
        }
    }

    /// Decode the role-specific columns of a type-table row
    pub fn details_from_row(&self, row: &SqliteRow) -> Result<TypeDetails, sqlx::Error> {
        let text = |col: &str| row.try_get::<Option<String>, _>(col);
        let member = |col: &str| -> Result<Option<MemberId>, sqlx::Error> {
            text(col)?
                .map(|v| v.parse::<MemberId>())
                .transpose()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))
        };

        let details = match self.member_type {
            MemberType::Director => TypeDetails::Director(DirectorDetails {
                designation: row.try_get("designation")?,
                message: text("message")?,
            }),
            MemberType::Professor => TypeDetails::Professor(ProfessorDetails {
                designation: row.try_get("designation")?,
                research_interests: text("research_interests")?,
                office_room: text("office_room")?,
            }),
            MemberType::PhdCandidate | MemberType::MastersCandidate => {
                let d = CandidateDetails {
                    thesis_title: text("thesis_title")?,
                    supervisor_id: member("supervisor_id")?,
                    student_number: text("student_number")?,
                };
                if self.member_type == MemberType::PhdCandidate {
                    TypeDetails::PhdCandidate(d)
                } else {
                    TypeDetails::MastersCandidate(d)
                }
            }
            MemberType::PostdocCandidate => TypeDetails::PostdocCandidate(PostdocDetails {
                research_topic: text("research_topic")?,
                host_professor_id: member("host_professor_id")?,
            }),
            MemberType::StaffMember => TypeDetails::StaffMember(StaffDetails {
                designation: row.try_get("designation")?,
            }),
        };
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_descriptor() {
        for (t, d) in MemberType::ALL.into_iter().zip(all()) {
            assert_eq!(d.member_type, t);
            assert!(d.allows_status(d.default_status));
            assert!(d.education_table.starts_with(d.table));
        }
    }

    #[test]
    fn test_status_vocabulary() {
        let prof = descriptor(MemberType::Professor);
        assert!(prof.allows_status(MemberStatus::Emeritus));
        assert!(!prof.allows_status(MemberStatus::Graduated));

        let phd = descriptor(MemberType::PhdCandidate);
        assert!(phd.allows_status(MemberStatus::Graduated));
        assert!(!phd.allows_status(MemberStatus::Alumni));

        let postdoc = descriptor(MemberType::PostdocCandidate);
        assert!(postdoc.allows_status(MemberStatus::Alumni));

        let staff = descriptor(MemberType::StaffMember);
        assert!(!staff.allows_status(MemberStatus::Emeritus));
    }

    #[test]
    fn test_child_collections() {
        assert!(descriptor(MemberType::Director).has_awards());
        assert!(!descriptor(MemberType::Director).has_documents());
        assert!(descriptor(MemberType::Professor).has_awards());
        assert!(descriptor(MemberType::Professor).has_documents());
        assert!(descriptor(MemberType::PhdCandidate).has_documents());
        assert!(!descriptor(MemberType::MastersCandidate).has_documents());
        assert!(!descriptor(MemberType::StaffMember).has_awards());
    }

    #[test]
    fn test_detail_values_align_with_columns() {
        let samples = [
            TypeDetails::Director(DirectorDetails::default()),
            TypeDetails::Professor(ProfessorDetails::default()),
            TypeDetails::PhdCandidate(CandidateDetails {
                supervisor_id: Some(MemberId::new(MemberType::Professor, 2)),
                ..Default::default()
            }),
            TypeDetails::MastersCandidate(CandidateDetails::default()),
            TypeDetails::PostdocCandidate(PostdocDetails::default()),
            TypeDetails::StaffMember(StaffDetails::default()),
        ];
        for details in samples {
            let d = descriptor(details.member_type());
            assert_eq!(d.detail_values(&details).len(), d.extra_columns.len());
        }

        let phd = descriptor(MemberType::PhdCandidate);
        let values = phd.detail_values(&TypeDetails::PhdCandidate(CandidateDetails {
            supervisor_id: Some(MemberId::new(MemberType::Professor, 2)),
            ..Default::default()
        }));
        assert_eq!(values[1].as_deref(), Some("P02MVSD"));
    }
}
