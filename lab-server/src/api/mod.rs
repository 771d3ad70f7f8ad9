//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`members`] - 成员登记、更新、查询接口
//! - [`auth`] - 登录校验接口
//! - [`notifications`] - 通知接口

pub mod auth;
pub mod health;
pub mod members;
pub mod middleware;
pub mod notifications;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

pub use crate::utils::AppResult;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(members::router())
        .merge(auth::router())
        .merge(notifications::router())
}

/// Build the application with all middleware
///
/// Used by the HTTP server and by tests driving the router directly.
pub fn build_app() -> Router<ServerState> {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
        // Request ID - set before everything above, echoed on the response
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header.clone(), XRequestId))
                .layer(PropagateRequestIdLayer::new(header)),
        )
}
