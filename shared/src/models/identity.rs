//! Identity fields and uniqueness conflicts
//!
//! [`MemberIdentity`] is the set of fields that must be unique across the
//! whole registry. [`ConflictReport`] classifies every collision found
//! between a candidate identity and the identities already on record.

use super::member::MemberId;
use crate::util::{non_empty, normalize_email};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Globally unique identity fields of one member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub other_emails: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub passport_number: Option<String>,
}

impl MemberIdentity {
    /// Canonical form used for comparison
    ///
    /// Emails are trimmed and lowercased, blank values dropped, and the
    /// secondary list deduplicated in first-seen order.
    pub fn normalized(&self) -> Self {
        let mut seen = BTreeSet::new();
        let other_emails = self
            .other_emails
            .iter()
            .map(|e| normalize_email(e))
            .filter(|e| !e.is_empty())
            .filter(|e| seen.insert(e.clone()))
            .collect();

        Self {
            primary_email: self
                .primary_email
                .as_deref()
                .map(normalize_email)
                .filter(|e| !e.is_empty()),
            other_emails,
            phone: non_empty(self.phone.as_deref()),
            id_number: non_empty(self.id_number.as_deref()),
            passport_number: non_empty(self.passport_number.as_deref()),
        }
    }

    /// Every email this identity holds (primary and secondary)
    pub fn all_emails(&self) -> BTreeSet<&str> {
        self.primary_email
            .iter()
            .chain(self.other_emails.iter())
            .map(String::as_str)
            .collect()
    }

    /// True when no identity field is present
    pub fn is_empty(&self) -> bool {
        self.primary_email.is_none()
            && self.other_emails.is_empty()
            && self.phone.is_none()
            && self.id_number.is_none()
            && self.passport_number.is_none()
    }
}

/// Identity field a uniqueness violation was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictDimension {
    /// Candidate's primary email is someone's primary email
    PrimaryEmail,
    /// Overlap between a secondary email and any email of another member
    SecondaryEmail,
    Phone,
    IdNumber,
    Passport,
}

impl ConflictDimension {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryEmail => "primary_email",
            Self::SecondaryEmail => "secondary_email",
            Self::Phone => "phone",
            Self::IdNumber => "id_number",
            Self::Passport => "passport",
        }
    }
}

impl fmt::Display for ConflictDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collision: which field, which existing member, which value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Conflict {
    pub dimension: ConflictDimension,
    pub member_id: MemberId,
    pub value: String,
}

/// Every conflict found for a candidate identity
///
/// An empty report means no conflict. The set is ordered, so the same
/// stored data always yields the same report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: BTreeSet<Conflict>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clear(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Distinct dimensions that conflicted
    pub fn dimensions(&self) -> BTreeSet<ConflictDimension> {
        self.conflicts.iter().map(|c| c.dimension).collect()
    }

    pub fn has(&self, dimension: ConflictDimension) -> bool {
        self.conflicts.iter().any(|c| c.dimension == dimension)
    }

    /// Existing members involved in at least one conflict
    pub fn member_ids(&self) -> BTreeSet<MemberId> {
        self.conflicts.iter().map(|c| c.member_id).collect()
    }

    pub fn insert(&mut self, dimension: ConflictDimension, member_id: MemberId, value: &str) {
        self.conflicts.insert(Conflict {
            dimension,
            member_id,
            value: value.to_string(),
        });
    }

    /// Compare a candidate against one existing member and record every overlap
    ///
    /// Both identities are expected in [`MemberIdentity::normalized`] form.
    pub fn record(
        &mut self,
        candidate: &MemberIdentity,
        existing_id: MemberId,
        existing: &MemberIdentity,
    ) {
        let existing_primary = existing.primary_email.as_deref();
        let existing_others: BTreeSet<&str> =
            existing.other_emails.iter().map(String::as_str).collect();

        if let Some(primary) = candidate.primary_email.as_deref() {
            if existing_primary == Some(primary) {
                self.insert(ConflictDimension::PrimaryEmail, existing_id, primary);
            }
            if existing_others.contains(primary) {
                self.insert(ConflictDimension::SecondaryEmail, existing_id, primary);
            }
        }

        for email in &candidate.other_emails {
            if existing_primary == Some(email.as_str()) || existing_others.contains(email.as_str())
            {
                self.insert(ConflictDimension::SecondaryEmail, existing_id, email);
            }
        }

        let pairs = [
            (ConflictDimension::Phone, &candidate.phone, &existing.phone),
            (ConflictDimension::IdNumber, &candidate.id_number, &existing.id_number),
            (
                ConflictDimension::Passport,
                &candidate.passport_number,
                &existing.passport_number,
            ),
        ];
        for (dimension, mine, theirs) in pairs {
            if let (Some(mine), Some(theirs)) = (mine, theirs)
                && mine == theirs
            {
                self.insert(dimension, existing_id, mine);
            }
        }
    }

    /// Short human-readable summary, e.g. `secondary_email, phone`
    pub fn summary(&self) -> String {
        self.dimensions()
            .iter()
            .map(ConflictDimension::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
