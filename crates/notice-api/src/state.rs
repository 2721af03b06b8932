//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use notice_service::NotificationDispatcher;
use notice_shared::config::AuthConfig;

use crate::auth::JwtManager;

/// Axum 应用共享状态
///
/// 分发器与 JWT 管理器通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// 通知分发器
    pub dispatcher: Arc<NotificationDispatcher>,
    /// JWT 管理器
    pub jwt_manager: Arc<JwtManager>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(dispatcher: Arc<NotificationDispatcher>, auth: &AuthConfig) -> Self {
        Self {
            dispatcher,
            jwt_manager: Arc::new(JwtManager::new(auth)),
        }
    }
}
