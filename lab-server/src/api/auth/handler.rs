//! Auth API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::models::RosterRow;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - 登录校验，成功返回名册行
///
/// 会话由外层 Web 应用签发
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<RosterRow>> {
    let row = state
        .registry
        .verify_credentials(&req.email, &req.password)
        .await?;
    Ok(Json(row))
}
