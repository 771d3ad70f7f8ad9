//! Notification API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|--------|-------------|
//! | /api/notifications | GET | `?member_id=&unread_only=`，按时间倒序 |
//! | /api/notifications/{id}/read | PUT | 标记为已读 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}/read", put(handler::mark_read))
}
