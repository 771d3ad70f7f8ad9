//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|--------|-------------|
//! | /health | GET | 版本号与数据库连通性 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = state.db.ping().await;
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
