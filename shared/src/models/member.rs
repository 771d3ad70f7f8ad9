//! Member types, identifiers and statuses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Constant token closing every member identifier (`D01MVSD`).
pub const ID_SUFFIX: &str = "MVSD";

/// Minimum width of the zero-padded numeric run.
///
/// Numbers that need more digits are written in full, never truncated.
pub const ID_WIDTH: usize = 2;

/// Closed set of roles a person in the registry can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberType {
    Director,
    Professor,
    PhdCandidate,
    MastersCandidate,
    PostdocCandidate,
    StaffMember,
}

impl MemberType {
    pub const ALL: [MemberType; 6] = [
        MemberType::Director,
        MemberType::Professor,
        MemberType::PhdCandidate,
        MemberType::MastersCandidate,
        MemberType::PostdocCandidate,
        MemberType::StaffMember,
    ];

    /// Discriminator stored in the roster's `member_type` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Director => "director",
            Self::Professor => "professor",
            Self::PhdCandidate => "phd_candidate",
            Self::MastersCandidate => "masters_candidate",
            Self::PostdocCandidate => "postdoc_candidate",
            Self::StaffMember => "staff_member",
        }
    }

    /// Identifier prefix (`PHDC` in `PHDC07MVSD`)
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::Director => "D",
            Self::Professor => "P",
            Self::PhdCandidate => "PHDC",
            Self::MastersCandidate => "MASTC",
            Self::PostdocCandidate => "POSTDC",
            Self::StaffMember => "STF",
        }
    }

    /// Human-readable label used in notification titles and log lines
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Director => "Director",
            Self::Professor => "Professor",
            Self::PhdCandidate => "PhD candidate",
            Self::MastersCandidate => "Master's candidate",
            Self::PostdocCandidate => "Postdoc candidate",
            Self::StaffMember => "Staff member",
        }
    }

    /// Resolve a type from its exact identifier prefix
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id_prefix() == prefix)
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown member type: {s}"))
    }
}

/// Errors from parsing a member identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMemberIdError {
    #[error("identifier must end with {ID_SUFFIX}: {0}")]
    MissingSuffix(String),
    #[error("identifier has no numeric run: {0}")]
    MissingDigits(String),
    #[error("unknown identifier prefix: {0}")]
    UnknownPrefix(String),
    #[error("identifier is not zero-padded canonically: {0}")]
    NonCanonical(String),
    #[error("identifier number is out of range: {0}")]
    Overflow(String),
}

/// External member identifier: `<Prefix><NN><Suffix>`
///
/// Ordering follows (type, number), so widened identifiers (`D100MVSD`)
/// sort after `D99MVSD` even though they don't lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId {
    member_type: MemberType,
    number: u64,
}

impl MemberId {
    pub const fn new(member_type: MemberType, number: u64) -> Self {
        Self {
            member_type,
            number,
        }
    }

    /// The identifier following this one, `None` on numeric overflow
    pub fn next(&self) -> Option<Self> {
        self.number
            .checked_add(1)
            .map(|n| Self::new(self.member_type, n))
    }

    pub const fn member_type(&self) -> MemberType {
        self.member_type
    }

    pub const fn number(&self) -> u64 {
        self.number
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}{}",
            self.member_type.id_prefix(),
            self.number,
            ID_SUFFIX,
            width = ID_WIDTH
        )
    }
}

impl FromStr for MemberId {
    type Err = ParseMemberIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_suffix(ID_SUFFIX)
            .ok_or_else(|| ParseMemberIdError::MissingSuffix(s.to_string()))?;
        let split = body
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| ParseMemberIdError::MissingDigits(s.to_string()))?;
        let (prefix, digits) = body.split_at(split);
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseMemberIdError::MissingDigits(s.to_string()));
        }
        let member_type = MemberType::from_prefix(prefix)
            .ok_or_else(|| ParseMemberIdError::UnknownPrefix(prefix.to_string()))?;
        let number: u64 = digits
            .parse()
            .map_err(|_| ParseMemberIdError::Overflow(s.to_string()))?;

        let id = Self::new(member_type, number);
        if id.to_string() != s {
            return Err(ParseMemberIdError::NonCanonical(s.to_string()));
        }
        Ok(id)
    }
}

impl TryFrom<String> for MemberId {
    type Error = ParseMemberIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.to_string()
    }
}

/// Member status; which values apply depends on the member type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Emeritus,
    Graduated,
    Alumni,
}

impl MemberStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Emeritus => "emeritus",
            Self::Graduated => "graduated",
            Self::Alumni => "alumni",
        }
    }

    /// Every status other than `Active` closes the membership and needs an end date
    pub const fn is_ended(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "emeritus" => Ok(Self::Emeritus),
            "graduated" => Ok(Self::Graduated),
            "alumni" => Ok(Self::Alumni),
            other => Err(format!("unknown member status: {other}")),
        }
    }
}
