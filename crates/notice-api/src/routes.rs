//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{
    auth::ADMIN_ROLE,
    handlers,
    middleware::{auth_middleware, require_role},
    state::AppState,
};

/// 通知相关路由
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(handlers::notification::create_notification).merge(
                get(handlers::notification::list_notifications)
                    .layer(middleware::from_fn(require_role(ADMIN_ROLE))),
            ),
        )
        .route(
            "/notifications/building/{building_id}",
            get(handlers::notification::list_building_notifications),
        )
        .route(
            "/notifications/{id}",
            get(handlers::notification::get_notification)
                .merge(delete(handlers::notification::delete_notification)),
        )
        // 兼容旧路径
        .route(
            "/notifications/notification/{id}",
            get(handlers::notification::get_notification),
        )
}

/// 所有 /api 下的路由
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(notification_routes())
}

/// 构建完整应用路由（含认证与探针）
///
/// CORS、安全头和可观测性中间件由调用方在外层叠加
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
