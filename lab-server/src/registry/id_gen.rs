//! Member identifier generation
//!
//! Numbers are per type and never reused. The next number is one past the
//! larger of the stored counter and the highest id already in the type
//! table, so rows inserted outside the registry are never shadowed. Past 99
//! the numeric part simply widens (`D100MVSD`).

use shared::models::MemberId;
use sqlx::SqliteConnection;

use super::descriptor::TypeDescriptor;
use super::error::{RegistryError, RegistryResult};

/// Allocate the next id for a type inside the caller's transaction
///
/// The counter upsert is the first statement so SQLite takes the write lock
/// before anything is read; two concurrent creates therefore serialize here.
/// Rolling back the transaction releases the number.
pub(crate) async fn next_id(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
) -> RegistryResult<MemberId> {
    let member_type = desc.member_type;
    let failed = |e: sqlx::Error| RegistryError::GenerationFailed(e.to_string());

    let counter: i64 = sqlx::query_scalar(
        "INSERT INTO member_sequences (member_type, last_number) VALUES (?, 0) \
         ON CONFLICT(member_type) DO UPDATE SET last_number = last_number \
         RETURNING last_number",
    )
    .bind(member_type.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(failed)?;

    let highest = highest_issued(conn, desc).await?;
    let counter = u64::try_from(counter).map_err(|_| {
        RegistryError::GenerationFailed(format!("negative counter for {member_type}"))
    })?;
    let last = MemberId::new(member_type, counter.max(highest.map_or(0, |id| id.number())));

    let next = last.next().ok_or_else(|| {
        RegistryError::GenerationFailed(format!("{member_type} identifier space exhausted"))
    })?;
    let stored = i64::try_from(next.number()).map_err(|_| {
        RegistryError::GenerationFailed(format!("{member_type} identifier space exhausted"))
    })?;

    sqlx::query("UPDATE member_sequences SET last_number = ? WHERE member_type = ?")
        .bind(stored)
        .bind(member_type.as_str())
        .execute(&mut *conn)
        .await
        .map_err(failed)?;

    Ok(next)
}

/// Id the next successful create of this type would receive (read-only)
pub(crate) async fn peek_next_id(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
) -> RegistryResult<MemberId> {
    let member_type = desc.member_type;
    let counter: Option<i64> =
        sqlx::query_scalar("SELECT last_number FROM member_sequences WHERE member_type = ?")
            .bind(member_type.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| RegistryError::GenerationFailed(e.to_string()))?;

    let counter = counter.and_then(|n| u64::try_from(n).ok()).unwrap_or(0);
    let highest = highest_issued(conn, desc).await?.map_or(0, |id| id.number());
    MemberId::new(member_type, counter.max(highest))
        .next()
        .ok_or_else(|| {
            RegistryError::GenerationFailed(format!("{member_type} identifier space exhausted"))
        })
}

/// Highest id stored in the type table
///
/// Ids widen past 99, so longer strings sort first.
async fn highest_issued(
    conn: &mut SqliteConnection,
    desc: &TypeDescriptor,
) -> RegistryResult<Option<MemberId>> {
    let sql = format!(
        "SELECT id FROM {} ORDER BY LENGTH(id) DESC, id DESC LIMIT 1",
        desc.table
    );
    let raw: Option<String> = sqlx::query_scalar(&sql)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RegistryError::GenerationFailed(e.to_string()))?;

    raw.map(|value| {
        value.parse::<MemberId>().map_err(|e| {
            RegistryError::GenerationFailed(format!("unparseable id '{value}' in {}: {e}", desc.table))
        })
    })
    .transpose()
}
