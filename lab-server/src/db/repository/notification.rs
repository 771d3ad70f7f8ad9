//! Notification Repository

use super::{RepoError, RepoResult, decode};
use shared::models::{MemberId, Notification, NotificationStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

const SELECT: &str = "SELECT id, member_id, title, status, created_at FROM notifications";

fn from_row(row: &SqliteRow) -> RepoResult<Notification> {
    let member_id: String = row.try_get("member_id")?;
    let status: String = row.try_get("status")?;
    Ok(Notification {
        id: row.try_get("id")?,
        member_id: decode(&member_id, "member_id")?,
        title: row.try_get("title")?,
        status: decode(&status, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert an unread notification, returning its id
pub async fn insert(
    conn: &mut SqliteConnection,
    member_id: MemberId,
    title: &str,
    now: i64,
) -> RepoResult<i64> {
    let result = sqlx::query(
        "INSERT INTO notifications (member_id, title, status, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(member_id.to_string())
    .bind(title)
    .bind(NotificationStatus::Unread.as_str())
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Newest first
pub async fn list(
    conn: &mut SqliteConnection,
    member_id: Option<MemberId>,
    unread_only: bool,
) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "{SELECT} WHERE (?1 IS NULL OR member_id = ?1) AND (?2 = 0 OR status = 'unread') \
         ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query(&sql)
        .bind(member_id.map(|id| id.to_string()))
        .bind(unread_only)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(from_row).collect()
}

pub async fn mark_read(conn: &mut SqliteConnection, id: i64) -> RepoResult<Notification> {
    let result = sqlx::query("UPDATE notifications SET status = ? WHERE id = ?")
        .bind(NotificationStatus::Read.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("notification {id}")));
    }

    let sql = format!("{SELECT} WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_one(&mut *conn).await?;
    from_row(&row)
}
