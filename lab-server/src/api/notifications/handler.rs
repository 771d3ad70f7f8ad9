//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{MemberId, Notification};

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub member_id: Option<MemberId>,
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /api/notifications - 获取通知列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state
        .registry
        .list_notifications(query.member_id, query.unread_only)
        .await?;
    Ok(Json(notifications))
}

/// PUT /api/notifications/{id}/read - 标记通知已读
pub async fn mark_read(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Notification>> {
    let notification = state.registry.mark_notification_read(id).await?;
    Ok(Json(notification))
}
