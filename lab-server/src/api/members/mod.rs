//! Member API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|--------|-------------|
//! | /api/members | GET | 会员名册，`?member_type=&status=` |
//! | /api/members | POST | 登记新成员 |
//! | /api/members/conflicts | POST | 身份唯一性检查 |
//! | /api/members/{id} | GET | 名册行与完整档案 |
//! | /api/members/{id} | PUT | 更新成员 |
//! | /api/members/{id}/documents/{document_id} | DELETE | 删除文档 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub use handler::{
    AssetUpload, AwardUpload, ConflictCheckRequest, CreateMemberRequest, CreatedMember,
    DocumentUpload, UpdateMemberRequest,
};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/conflicts", post(handler::conflicts))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route(
            "/{id}/documents/{document_id}",
            delete(handler::delete_document),
        )
}
