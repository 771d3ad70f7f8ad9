//! Input validation
//!
//! Centralized length limits and the registry's caller-side rules. Every
//! check here is pure (the current date is passed in) and runs before the
//! registry touches storage or the database.

use chrono::{Datelike, NaiveDate};
use shared::models::{
    CareerEntry, EducationEntry, MemberStatus, MemberType, SocialLink, TypeDetails,
};
use shared::util::{non_empty, normalize_email};
use std::collections::BTreeSet;

use super::descriptor::TypeDescriptor;
use super::error::{RegistryError, RegistryResult};
use super::input::{MemberPatch, NewAward, NewDocument, NewMember};

// ── Text length limits ──────────────────────────────────────────────

/// Names, titles, degrees, institutions, designations
pub const MAX_NAME_LEN: usize = 200;

/// Award details, research interests, short notes
pub const MAX_NOTE_LEN: usize = 500;

/// Biographies and the director's message
pub const MAX_BIO_LEN: usize = 5000;

/// Phone, national ID, passport, student number, room, platform
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Social-media URLs
pub const MAX_URL_LEN: usize = 2048;

/// Minimum age at submission date
pub const MIN_AGE_YEARS: i32 = 18;

/// Oldest accepted year in education, career and award entries
pub const MIN_YEAR: i32 = 1900;

// ── Generic helpers ─────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> RegistryResult<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(field, "must not be empty"));
    }
    if value.chars().count() > max_len {
        return Err(RegistryError::validation(
            field,
            format!("is too long ({} chars, max {max_len})", value.chars().count()),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> RegistryResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(RegistryError::validation(
            field,
            format!("is too long ({} chars, max {max_len})", v.chars().count()),
        ));
    }
    Ok(())
}

/// `local@domain.tld`
pub fn validate_email(value: &str, field: &str) -> RegistryResult<()> {
    let invalid = || RegistryError::validation(field, format!("'{value}' is not a valid email"));

    if value.is_empty() || value.len() > MAX_EMAIL_LEN || value.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty()
        || host.split('.').any(str::is_empty)
        || tld.len() < 2
        || !tld.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(invalid());
    }
    Ok(())
}

/// Length 8..=128 with an upper-case letter, a lower-case letter, a digit and a symbol
pub fn validate_password(password: &str) -> RegistryResult<()> {
    let len = password.chars().count();
    let strong = (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len)
        && password.chars().any(char::is_uppercase)
        && password.chars().any(char::is_lowercase)
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    if strong {
        Ok(())
    } else {
        Err(RegistryError::WeakPassword)
    }
}

/// Completed years between `date_of_birth` and `today`
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

pub fn validate_age(date_of_birth: NaiveDate, today: NaiveDate) -> RegistryResult<()> {
    if age_on(date_of_birth, today) < MIN_AGE_YEARS {
        return Err(RegistryError::validation(
            "date_of_birth",
            format!("member must be at least {MIN_AGE_YEARS} years old"),
        ));
    }
    Ok(())
}

/// No year later than the current calendar year
pub fn validate_year(year: i32, field: &str, today: NaiveDate) -> RegistryResult<()> {
    if year > today.year() {
        return Err(RegistryError::validation(
            field,
            format!("{year} is in the future"),
        ));
    }
    if year < MIN_YEAR {
        return Err(RegistryError::validation(
            field,
            format!("{year} is before {MIN_YEAR}"),
        ));
    }
    Ok(())
}

/// Status must belong to the type; ended statuses need an end date and
/// `Active` must not carry one
pub fn validate_status(
    desc: &TypeDescriptor,
    status: MemberStatus,
    end_date: Option<NaiveDate>,
) -> RegistryResult<()> {
    if !desc.allows_status(status) {
        return Err(RegistryError::StatusNotAllowed {
            member_type: desc.member_type,
            status,
        });
    }
    match (status.is_ended(), end_date) {
        (true, None) => Err(RegistryError::validation(
            "end_date",
            format!("required when status is '{status}'"),
        )),
        (false, Some(_)) => Err(RegistryError::validation(
            "end_date",
            "must be empty while status is 'active'",
        )),
        _ => Ok(()),
    }
}

/// Secondary emails: well-formed, distinct, and never the primary email
///
/// Returns the normalized list.
pub fn validate_other_emails(
    others: &[String],
    primary: Option<&str>,
) -> RegistryResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(others.len());
    for raw in others {
        let email = normalize_email(raw);
        validate_email(&email, "other_emails")?;
        if primary == Some(email.as_str()) {
            return Err(RegistryError::validation(
                "other_emails",
                format!("'{email}' is already the primary email"),
            ));
        }
        if !seen.insert(email.clone()) {
            return Err(RegistryError::validation(
                "other_emails",
                format!("'{email}' is listed twice"),
            ));
        }
        normalized.push(email);
    }
    Ok(normalized)
}

// ── Role-specific fields and child collections ──────────────────────

pub fn validate_details(desc: &TypeDescriptor, details: &TypeDetails) -> RegistryResult<()> {
    if details.member_type() != desc.member_type {
        return Err(RegistryError::validation(
            "details",
            format!("must describe a {}", desc.member_type.label()),
        ));
    }

    match details {
        TypeDetails::Director(d) => {
            validate_required_text(&d.designation, "designation", MAX_NAME_LEN)?;
            validate_optional_text(&d.message, "message", MAX_BIO_LEN)?;
        }
        TypeDetails::Professor(d) => {
            validate_required_text(&d.designation, "designation", MAX_NAME_LEN)?;
            validate_optional_text(&d.research_interests, "research_interests", MAX_NOTE_LEN)?;
            validate_optional_text(&d.office_room, "office_room", MAX_SHORT_TEXT_LEN)?;
        }
        TypeDetails::PhdCandidate(d) | TypeDetails::MastersCandidate(d) => {
            validate_optional_text(&d.thesis_title, "thesis_title", MAX_NAME_LEN)?;
            validate_optional_text(&d.student_number, "student_number", MAX_SHORT_TEXT_LEN)?;
        }
        TypeDetails::PostdocCandidate(d) => {
            validate_optional_text(&d.research_topic, "research_topic", MAX_NAME_LEN)?;
        }
        TypeDetails::StaffMember(d) => {
            validate_required_text(&d.designation, "designation", MAX_NAME_LEN)?;
        }
    }

    if let Some(referenced) = details.referenced_professor()
        && referenced.member_type() != MemberType::Professor
    {
        let field = match details {
            TypeDetails::PostdocCandidate(_) => "host_professor_id",
            _ => "supervisor_id",
        };
        return Err(RegistryError::TypeMismatch {
            field: field.to_string(),
            expected: MemberType::Professor,
            actual: referenced,
        });
    }
    Ok(())
}

pub fn validate_education(entries: &[EducationEntry], today: NaiveDate) -> RegistryResult<()> {
    for e in entries {
        validate_required_text(&e.degree, "education.degree", MAX_NAME_LEN)?;
        validate_required_text(&e.institution, "education.institution", MAX_NAME_LEN)?;
        validate_year(e.passing_year, "education.passing_year", today)?;
    }
    Ok(())
}

pub fn validate_career(entries: &[CareerEntry], today: NaiveDate) -> RegistryResult<()> {
    for e in entries {
        validate_required_text(&e.position, "career.position", MAX_NAME_LEN)?;
        validate_required_text(&e.organization, "career.organization", MAX_NAME_LEN)?;
        validate_year(e.joining_year, "career.joining_year", today)?;
        if let Some(leaving) = e.leaving_year {
            validate_year(leaving, "career.leaving_year", today)?;
            if leaving < e.joining_year {
                return Err(RegistryError::validation(
                    "career.leaving_year",
                    "must not be before the joining year",
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_social_links(links: &[SocialLink]) -> RegistryResult<()> {
    for link in links {
        validate_required_text(&link.platform, "social_links.platform", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&link.url, "social_links.url", MAX_URL_LEN)?;
        if !(link.url.starts_with("https://") || link.url.starts_with("http://")) {
            return Err(RegistryError::validation(
                "social_links.url",
                format!("'{}' must be an http(s) URL", link.url),
            ));
        }
    }
    Ok(())
}

pub fn validate_awards(
    desc: &TypeDescriptor,
    awards: &[NewAward],
    today: NaiveDate,
) -> RegistryResult<()> {
    if awards.is_empty() {
        return Ok(());
    }
    if !desc.has_awards() {
        return Err(RegistryError::validation(
            "awards",
            format!("not supported for a {}", desc.member_type.label()),
        ));
    }
    for a in awards {
        validate_required_text(&a.title, "awards.title", MAX_NAME_LEN)?;
        validate_year(a.year, "awards.year", today)?;
        validate_optional_text(&a.details, "awards.details", MAX_NOTE_LEN)?;
    }
    Ok(())
}

pub fn validate_documents(desc: &TypeDescriptor, documents: &[NewDocument]) -> RegistryResult<()> {
    if documents.is_empty() {
        return Ok(());
    }
    if !desc.has_documents() {
        return Err(RegistryError::validation(
            "documents",
            format!("not supported for a {}", desc.member_type.label()),
        ));
    }
    for d in documents {
        validate_required_text(&d.title, "documents.title", MAX_NAME_LEN)?;
        validate_required_text(&d.document_type, "documents.document_type", MAX_SHORT_TEXT_LEN)?;
    }
    Ok(())
}

// ── Operation inputs ────────────────────────────────────────────────

/// Validate a create request and return it in normalized form
///
/// Names are trimmed, emails lowercased, blank optional fields dropped and
/// the status defaulted.
pub fn validate_new_member(
    desc: &TypeDescriptor,
    mut input: NewMember,
    today: NaiveDate,
) -> RegistryResult<NewMember> {
    input.first_name = input.first_name.trim().to_string();
    input.last_name = input.last_name.trim().to_string();
    validate_required_text(&input.first_name, "first_name", MAX_NAME_LEN)?;
    validate_required_text(&input.last_name, "last_name", MAX_NAME_LEN)?;

    input.primary_email = normalize_email(&input.primary_email);
    validate_email(&input.primary_email, "primary_email")?;
    input.other_emails = validate_other_emails(&input.other_emails, Some(&input.primary_email))?;

    input.phone = non_empty(input.phone.as_deref());
    input.id_number = non_empty(input.id_number.as_deref());
    input.passport_number = non_empty(input.passport_number.as_deref());
    validate_optional_text(&input.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&input.id_number, "id_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&input.passport_number, "passport_number", MAX_SHORT_TEXT_LEN)?;

    validate_password(&input.password)?;
    validate_age(input.date_of_birth, today)?;
    input.biography = non_empty(input.biography.as_deref());
    validate_optional_text(&input.biography, "biography", MAX_BIO_LEN)?;

    validate_year(input.start_date.year(), "start_date", today)?;
    if let Some(end) = input.end_date
        && end < input.start_date
    {
        return Err(RegistryError::validation(
            "end_date",
            "must not be before the start date",
        ));
    }
    let status = input.status.unwrap_or(desc.default_status);
    validate_status(desc, status, input.end_date)?;
    input.status = Some(status);

    validate_details(desc, &input.details)?;
    validate_education(&input.education, today)?;
    validate_career(&input.career, today)?;
    validate_social_links(&input.social_links)?;
    validate_awards(desc, &input.awards, today)?;
    validate_documents(desc, &input.documents)?;

    Ok(input)
}

/// Validate an update request and return it in normalized form
///
/// Rules that depend on the stored profile (secondary email against the
/// primary, end date without a status change) are checked by the updater.
pub fn validate_patch(
    desc: &TypeDescriptor,
    mut patch: MemberPatch,
    today: NaiveDate,
) -> RegistryResult<MemberPatch> {
    if let Some(password) = &patch.password {
        validate_password(password)?;
    }

    for (value, field) in [
        (&mut patch.first_name, "first_name"),
        (&mut patch.last_name, "last_name"),
    ] {
        if let Some(v) = value {
            *v = v.trim().to_string();
            validate_required_text(v, field, MAX_NAME_LEN)?;
        }
    }

    if let Some(others) = &patch.other_emails {
        patch.other_emails = Some(validate_other_emails(others, None)?);
    }

    for (value, field) in [
        (&mut patch.phone, "phone"),
        (&mut patch.id_number, "id_number"),
        (&mut patch.passport_number, "passport_number"),
    ] {
        if let Some(v) = value {
            *v = v.trim().to_string();
            validate_required_text(v, field, MAX_SHORT_TEXT_LEN)?;
        }
    }
    validate_optional_text(&patch.biography, "biography", MAX_BIO_LEN)?;

    if let Some(status) = patch.status {
        validate_status(desc, status, patch.end_date)?;
    }

    if let Some(details) = &patch.details {
        validate_details(desc, details)?;
    }
    if let Some(education) = &patch.education {
        validate_education(education, today)?;
    }
    if let Some(career) = &patch.career {
        validate_career(career, today)?;
    }
    if let Some(links) = &patch.social_links {
        validate_social_links(links)?;
    }
    validate_awards(desc, &patch.new_awards, today)?;
    validate_documents(desc, &patch.new_documents)?;
    if !patch.remove_documents.is_empty() && !desc.has_documents() {
        return Err(RegistryError::validation(
            "remove_documents",
            format!("not supported for a {}", desc.member_type.label()),
        ));
    }

    Ok(patch)
}
