//! Cross-type uniqueness guard
//!
//! Checks a candidate identity against the shared roster and every type
//! table, so a collision is caught even when the two tables disagree. The
//! SQL only prefilters; classification happens in
//! [`ConflictReport::record`].

use shared::models::{ConflictReport, MemberId, MemberIdentity};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::descriptor;
use super::error::{RegistryError, RegistryResult};

/// Every table holding identity columns
fn identity_tables() -> impl Iterator<Item = &'static str> {
    std::iter::once("members").chain(descriptor::all().map(|d| d.table))
}

fn unavailable(err: impl std::fmt::Display) -> RegistryError {
    RegistryError::GuardUnavailable(err.to_string())
}

fn identity_from_row(row: &SqliteRow) -> RegistryResult<(MemberId, MemberIdentity)> {
    let id: String = row.try_get("id").map_err(unavailable)?;
    let other_emails: String = row.try_get("other_emails").map_err(unavailable)?;
    let identity = MemberIdentity {
        primary_email: row.try_get("primary_email").map_err(unavailable)?,
        other_emails: serde_json::from_str(&other_emails).map_err(unavailable)?,
        phone: row.try_get("phone").map_err(unavailable)?,
        id_number: row.try_get("id_number").map_err(unavailable)?,
        passport_number: row.try_get("passport_number").map_err(unavailable)?,
    };
    let id = id.parse::<MemberId>().map_err(unavailable)?;
    Ok((id, identity.normalized()))
}

/// Report every existing member whose identity overlaps `candidate`
///
/// `exclude` skips the member being updated. An empty candidate is always
/// clear. Read-only: running it twice with no writes in between gives the
/// same report.
pub(crate) async fn check_conflicts(
    conn: &mut SqliteConnection,
    candidate: &MemberIdentity,
    exclude: Option<MemberId>,
) -> RegistryResult<ConflictReport> {
    let candidate = candidate.normalized();
    let mut report = ConflictReport::new();
    if candidate.is_empty() {
        return Ok(report);
    }

    let emails: Vec<&str> = candidate.all_emails().into_iter().collect();
    let emails = serde_json::to_string(&emails).map_err(unavailable)?;
    let exclude = exclude.map(|id| id.to_string());

    for table in identity_tables() {
        let sql = format!(
            "SELECT id, primary_email, other_emails, phone, id_number, passport_number \
             FROM {table} \
             WHERE (?1 IS NULL OR id != ?1) AND ( \
                 lower(primary_email) IN (SELECT value FROM json_each(?2)) \
                 OR EXISTS (SELECT 1 FROM json_each({table}.other_emails) o \
                            WHERE lower(o.value) IN (SELECT value FROM json_each(?2))) \
                 OR (?3 IS NOT NULL AND phone = ?3) \
                 OR (?4 IS NOT NULL AND id_number = ?4) \
                 OR (?5 IS NOT NULL AND passport_number = ?5))"
        );
        let rows = sqlx::query(&sql)
            .bind(exclude.as_deref())
            .bind(&emails)
            .bind(candidate.phone.as_deref())
            .bind(candidate.id_number.as_deref())
            .bind(candidate.passport_number.as_deref())
            .fetch_all(&mut *conn)
            .await
            .map_err(unavailable)?;

        for row in &rows {
            let (existing_id, existing) = identity_from_row(row)?;
            report.record(&candidate, existing_id, &existing);
        }
    }

    if !report.is_clear() {
        tracing::debug!(conflicts = %report.summary(), "Identity conflicts found");
    }
    Ok(report)
}
