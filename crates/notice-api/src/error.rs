//! HTTP 错误类型定义
//!
//! 服务层错误在这里统一映射为 HTTP 状态码和错误响应体

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notice_service::NoticeError;
use notice_shared::observability::tracing::current_trace_id;
use serde_json::json;

/// HTTP 层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("楼栋不存在: {0}")]
    BuildingNotFound(i64),
    #[error("通知不存在: {0}")]
    NotificationNotFound(i64),

    // 系统错误
    #[error("通知记录保存失败: {0}")]
    Persistence(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BuildingNotFound(_) | Self::NotificationNotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BuildingNotFound(_) => "BUILDING_NOT_FOUND",
            Self::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Persistence(e) => {
                tracing::error!(
                    error = %e,
                    trace_id = ?current_trace_id(),
                    "通知已投递但记录保存失败"
                );
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, trace_id = ?current_trace_id(), "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析（缺字段、类型错误、非 JSON）按参数错误处理
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 路径参数无法解析（如非数字 ID）按参数错误处理
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// 从服务层错误转换
impl From<NoticeError> for ApiError {
    fn from(err: NoticeError) -> Self {
        match err {
            NoticeError::Validation(msg) => Self::Validation(msg),
            NoticeError::BuildingNotFound(id) => Self::BuildingNotFound(id),
            NoticeError::NotificationNotFound(id) => Self::NotificationNotFound(id),
            NoticeError::Persistence(msg) => Self::Persistence(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// HTTP 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
