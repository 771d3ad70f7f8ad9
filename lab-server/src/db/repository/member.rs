//! Member Repository
//!
//! Type tables, the shared `members` roster and the per-type child tables.
//! Table and column names come from the static type descriptors.

use super::{RepoError, RepoResult, decode};
use crate::registry::descriptor::TypeDescriptor;
use shared::models::{
    Award, CareerEntry, Document, EducationEntry, MemberId, MemberProfile, MemberStatus,
    MemberType, ProfileFields, RosterRow, SocialLink, TypeProfile,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

const COMMON_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "primary_email",
    "other_emails",
    "phone",
    "id_number",
    "passport_number",
    "password_hash",
    "date_of_birth",
    "biography",
    "status",
    "photo_path",
];

const ROSTER_SELECT: &str = "SELECT id, member_type, first_name, last_name, primary_email, \
     other_emails, phone, id_number, passport_number, password_hash, status, photo_path, \
     start_date, end_date FROM members";

/// Column list of a type table, without `id` and timestamps
fn profile_columns(desc: &TypeDescriptor) -> Vec<&'static str> {
    let mut columns = COMMON_COLUMNS.to_vec();
    columns.push(desc.start_column);
    columns.push(desc.end_column);
    columns.extend_from_slice(desc.extra_columns);
    columns
}

/// Values aligned with [`profile_columns`]
fn profile_values(desc: &TypeDescriptor, profile: &TypeProfile) -> RepoResult<Vec<Option<String>>> {
    let f = &profile.fields;
    let mut values = vec![
        Some(f.first_name.clone()),
        Some(f.last_name.clone()),
        Some(f.primary_email.clone()),
        Some(serde_json::to_string(&f.other_emails)?),
        f.phone.clone(),
        f.id_number.clone(),
        f.passport_number.clone(),
        Some(profile.password_hash.clone()),
        Some(f.date_of_birth.to_string()),
        f.biography.clone(),
        Some(f.status.as_str().to_string()),
        f.photo_path.clone(),
        Some(f.start_date.to_string()),
        f.end_date.map(|d| d.to_string()),
    ];
    values.extend(desc.detail_values(&profile.details));
    Ok(values)
}

// =========================================================================
// Type profile
// =========================================================================

pub async fn insert_profile(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    profile: &TypeProfile,
    now: i64,
) -> RepoResult<()> {
    let columns = profile_columns(desc);
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} (id, {}, created_at, updated_at) VALUES (?, {placeholders}, ?, ?)",
        desc.table,
        columns.join(", "),
    );

    let mut query = sqlx::query(&sql).bind(profile.id.to_string());
    for value in profile_values(desc, profile)? {
        query = query.bind(value);
    }
    query.bind(now).bind(now).execute(&mut *conn).await?;
    Ok(())
}

pub async fn update_profile(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    profile: &TypeProfile,
    now: i64,
) -> RepoResult<()> {
    let assignments = profile_columns(desc)
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments}, updated_at = ? WHERE id = ?",
        desc.table
    );

    let mut query = sqlx::query(&sql);
    for value in profile_values(desc, profile)? {
        query = query.bind(value);
    }
    let result = query
        .bind(now)
        .bind(profile.id.to_string())
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(profile.id.to_string()));
    }
    Ok(())
}

fn profile_from_row(desc: &TypeDescriptor, row: &SqliteRow) -> RepoResult<TypeProfile> {
    let id: String = row.try_get("id")?;
    let other_emails: String = row.try_get("other_emails")?;
    let status: String = row.try_get("status")?;

    Ok(TypeProfile {
        id: decode(&id, "id")?,
        fields: ProfileFields {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            primary_email: row.try_get("primary_email")?,
            other_emails: serde_json::from_str(&other_emails)?,
            phone: row.try_get("phone")?,
            id_number: row.try_get("id_number")?,
            passport_number: row.try_get("passport_number")?,
            date_of_birth: row.try_get("date_of_birth")?,
            biography: row.try_get("biography")?,
            status: decode(&status, "status")?,
            photo_path: row.try_get("photo_path")?,
            start_date: row.try_get(desc.start_column)?,
            end_date: row.try_get(desc.end_column)?,
        },
        details: desc.details_from_row(row)?,
        password_hash: row.try_get("password_hash")?,
    })
}

async fn fetch_profile_row(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Option<SqliteRow>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", desc.table);
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_profile(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Option<TypeProfile>> {
    fetch_profile_row(conn, desc, id)
        .await?
        .map(|row| profile_from_row(desc, &row))
        .transpose()
}

/// Type profile with every child collection
pub async fn find_member(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Option<MemberProfile>> {
    let Some(row) = fetch_profile_row(conn, desc, id).await? else {
        return Ok(None);
    };
    let profile = profile_from_row(desc, &row)?;
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    Ok(Some(MemberProfile {
        profile,
        education: list_education(conn, desc, id).await?,
        career: list_career(conn, desc, id).await?,
        social_links: list_social_links(conn, desc, id).await?,
        awards: list_awards(conn, desc, id).await?,
        documents: list_documents(conn, desc, id).await?,
        created_at,
        updated_at,
    }))
}

/// Whether a type-table row with this id exists
pub async fn profile_exists(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<bool> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?", desc.table);
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id.to_string())
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

// =========================================================================
// Roster
// =========================================================================

pub async fn insert_roster(conn: &mut SqliteConnection, row: &RosterRow, now: i64) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO members (id, member_type, first_name, last_name, primary_email, other_emails, \
         phone, id_number, passport_number, password_hash, status, photo_path, start_date, end_date, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(row.id.to_string())
    .bind(row.member_type.as_str())
    .bind(&row.first_name)
    .bind(&row.last_name)
    .bind(&row.primary_email)
    .bind(serde_json::to_string(&row.other_emails)?)
    .bind(&row.phone)
    .bind(&row.id_number)
    .bind(&row.passport_number)
    .bind(&row.password_hash)
    .bind(row.status.as_str())
    .bind(&row.photo_path)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_roster(conn: &mut SqliteConnection, row: &RosterRow, now: i64) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE members SET first_name = ?, last_name = ?, primary_email = ?, other_emails = ?, \
         phone = ?, id_number = ?, passport_number = ?, password_hash = ?, status = ?, \
         photo_path = ?, start_date = ?, end_date = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&row.first_name)
    .bind(&row.last_name)
    .bind(&row.primary_email)
    .bind(serde_json::to_string(&row.other_emails)?)
    .bind(&row.phone)
    .bind(&row.id_number)
    .bind(&row.passport_number)
    .bind(&row.password_hash)
    .bind(row.status.as_str())
    .bind(&row.photo_path)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(now)
    .bind(row.id.to_string())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(row.id.to_string()));
    }
    Ok(())
}

/// Bump `updated_at` on the roster row
///
/// Issued first inside an update transaction so SQLite takes the write lock
/// before anything is read.
pub async fn touch_roster(conn: &mut SqliteConnection, id: MemberId, now: i64) -> RepoResult<()> {
    let result = sqlx::query("UPDATE members SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(id.to_string()));
    }
    Ok(())
}

fn roster_from_row(row: &SqliteRow) -> RepoResult<RosterRow> {
    let id: String = row.try_get("id")?;
    let member_type: String = row.try_get("member_type")?;
    let other_emails: String = row.try_get("other_emails")?;
    let status: String = row.try_get("status")?;

    Ok(RosterRow {
        id: decode(&id, "id")?,
        member_type: decode(&member_type, "member_type")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        primary_email: row.try_get("primary_email")?,
        other_emails: serde_json::from_str(&other_emails)?,
        phone: row.try_get("phone")?,
        id_number: row.try_get("id_number")?,
        passport_number: row.try_get("passport_number")?,
        password_hash: row.try_get("password_hash")?,
        status: decode(&status, "status")?,
        photo_path: row.try_get("photo_path")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
    })
}

pub async fn find_roster(conn: &mut SqliteConnection, id: MemberId) -> RepoResult<Option<RosterRow>> {
    let sql = format!("{ROSTER_SELECT} WHERE id = ?");
    sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .map(|row| roster_from_row(&row))
        .transpose()
}

/// Login lookup by primary email (already normalized)
pub async fn find_roster_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> RepoResult<Option<RosterRow>> {
    let sql = format!("{ROSTER_SELECT} WHERE primary_email = ?");
    sqlx::query(&sql)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?
        .map(|row| roster_from_row(&row))
        .transpose()
}

/// Roster rows, optionally filtered by type and status, in id order
pub async fn list_roster(
    conn: &mut SqliteConnection,
    member_type: Option<MemberType>,
    status: Option<MemberStatus>,
) -> RepoResult<Vec<RosterRow>> {
    let sql = format!(
        "{ROSTER_SELECT} WHERE (?1 IS NULL OR member_type = ?1) AND (?2 IS NULL OR status = ?2)"
    );
    let rows = sqlx::query(&sql)
        .bind(member_type.map(|t| t.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&mut *conn)
        .await?;

    let mut roster = rows
        .iter()
        .map(roster_from_row)
        .collect::<RepoResult<Vec<_>>>()?;
    roster.sort_by_key(|r| r.id);
    Ok(roster)
}

// =========================================================================
// Child collections
// =========================================================================

pub async fn replace_education(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    entries: &[EducationEntry],
) -> RepoResult<()> {
    let delete = format!("DELETE FROM {} WHERE member_id = ?", desc.education_table);
    sqlx::query(&delete)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    let insert = format!(
        "INSERT INTO {} (member_id, degree, institution, passing_year) VALUES (?, ?, ?, ?)",
        desc.education_table
    );
    for e in entries {
        sqlx::query(&insert)
            .bind(id.to_string())
            .bind(&e.degree)
            .bind(&e.institution)
            .bind(e.passing_year)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn replace_career(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    entries: &[CareerEntry],
) -> RepoResult<()> {
    let delete = format!("DELETE FROM {} WHERE member_id = ?", desc.career_table);
    sqlx::query(&delete)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    let insert = format!(
        "INSERT INTO {} (member_id, position, organization, joining_year, leaving_year) \
         VALUES (?, ?, ?, ?, ?)",
        desc.career_table
    );
    for e in entries {
        sqlx::query(&insert)
            .bind(id.to_string())
            .bind(&e.position)
            .bind(&e.organization)
            .bind(e.joining_year)
            .bind(e.leaving_year)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn replace_social_links(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    links: &[SocialLink],
) -> RepoResult<()> {
    let delete = format!("DELETE FROM {} WHERE member_id = ?", desc.social_table);
    sqlx::query(&delete)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;

    let insert = format!(
        "INSERT INTO {} (member_id, platform, url) VALUES (?, ?, ?)",
        desc.social_table
    );
    for link in links {
        sqlx::query(&insert)
            .bind(id.to_string())
            .bind(&link.platform)
            .bind(&link.url)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn award_table(desc: &TypeDescriptor) -> RepoResult<&'static str> {
    desc.award_table.ok_or_else(|| {
        RepoError::Validation(format!("{} has no awards", desc.member_type.label()))
    })
}

fn document_table(desc: &TypeDescriptor) -> RepoResult<&'static str> {
    desc.document_table.ok_or_else(|| {
        RepoError::Validation(format!("{} has no documents", desc.member_type.label()))
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_award(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    title: &str,
    year: i32,
    details: Option<&str>,
    photo_path: Option<&str>,
    now: i64,
) -> RepoResult<i64> {
    let sql = format!(
        "INSERT INTO {} (member_id, title, year, details, photo_path, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        award_table(desc)?
    );
    let result = sqlx::query(&sql)
        .bind(id.to_string())
        .bind(title)
        .bind(year)
        .bind(details)
        .bind(photo_path)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_document(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    title: &str,
    document_type: &str,
    file_path: &str,
    now: i64,
) -> RepoResult<i64> {
    let sql = format!(
        "INSERT INTO {} (member_id, title, document_type, file_path, created_at) \
         VALUES (?, ?, ?, ?, ?)",
        document_table(desc)?
    );
    let result = sqlx::query(&sql)
        .bind(id.to_string())
        .bind(title)
        .bind(document_type)
        .bind(file_path)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_document(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    document_id: i64,
) -> RepoResult<Option<Document>> {
    let sql = format!(
        "SELECT id, title, document_type, file_path FROM {} WHERE id = ? AND member_id = ?",
        document_table(desc)?
    );
    let row = sqlx::query(&sql)
        .bind(document_id)
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|r| document_from_row(&r)).transpose()
}

pub async fn delete_document(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
    document_id: i64,
) -> RepoResult<()> {
    let sql = format!(
        "DELETE FROM {} WHERE id = ? AND member_id = ?",
        document_table(desc)?
    );
    let result = sqlx::query(&sql)
        .bind(document_id)
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("document {document_id}")));
    }
    Ok(())
}

async fn list_education(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Vec<EducationEntry>> {
    let sql = format!(
        "SELECT degree, institution, passing_year FROM {} WHERE member_id = ? ORDER BY id",
        desc.education_table
    );
    let rows = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|r| -> RepoResult<EducationEntry> {
            Ok(EducationEntry {
                degree: r.try_get("degree")?,
                institution: r.try_get("institution")?,
                passing_year: r.try_get("passing_year")?,
            })
        })
        .collect()
}

async fn list_career(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Vec<CareerEntry>> {
    let sql = format!(
        "SELECT position, organization, joining_year, leaving_year FROM {} \
         WHERE member_id = ? ORDER BY id",
        desc.career_table
    );
    let rows = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|r| -> RepoResult<CareerEntry> {
            Ok(CareerEntry {
                position: r.try_get("position")?,
                organization: r.try_get("organization")?,
                joining_year: r.try_get("joining_year")?,
                leaving_year: r.try_get("leaving_year")?,
            })
        })
        .collect()
}

async fn list_social_links(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Vec<SocialLink>> {
    let sql = format!(
        "SELECT platform, url FROM {} WHERE member_id = ? ORDER BY id",
        desc.social_table
    );
    let rows = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|r| -> RepoResult<SocialLink> {
            Ok(SocialLink {
                platform: r.try_get("platform")?,
                url: r.try_get("url")?,
            })
        })
        .collect()
}

async fn list_awards(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Vec<Award>> {
    let Some(table) = desc.award_table else {
        return Ok(Vec::new());
    };
    let sql = format!(
        "SELECT id, title, year, details, photo_path FROM {table} WHERE member_id = ? ORDER BY id"
    );
    let rows = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_all(&mut *conn)
        .await?;
    rows.iter()
        .map(|r| -> RepoResult<Award> {
            Ok(Award {
                id: r.try_get("id")?,
                title: r.try_get("title")?,
                year: r.try_get("year")?,
                details: r.try_get("details")?,
                photo_path: r.try_get("photo_path")?,
            })
        })
        .collect()
}

fn document_from_row(row: &SqliteRow) -> RepoResult<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        document_type: row.try_get("document_type")?,
        file_path: row.try_get("file_path")?,
    })
}

async fn list_documents(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
    id: MemberId,
) -> RepoResult<Vec<Document>> {
    let Some(table) = desc.document_table else {
        return Ok(Vec::new());
    };
    let sql = format!(
        "SELECT id, title, document_type, file_path FROM {table} WHERE member_id = ? ORDER BY id"
    );
    let rows = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(document_from_row).collect()
}
