//! Auth API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|--------|-------------|
//! | /api/auth/login | POST | 邮箱 + 密码登录校验 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::LoginRequest;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/auth/login", post(handler::login))
}
