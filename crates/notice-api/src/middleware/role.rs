//! 角色检查中间件

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;

use crate::auth::Claims;
use crate::error::ApiError;

/// 角色检查中间件工厂
///
/// 必须挂在 `auth_middleware` 之后，依赖其注入的 Claims
///
/// # 示例
/// ```ignore
/// .route("/notifications", get(list_notifications).layer(axum::middleware::from_fn(require_role("admin"))))
/// ```
pub fn require_role(
    role: &'static str,
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
+ Clone
+ Send {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move { check_role(request, next, role).await })
    }
}

async fn check_role(request: Request<Body>, next: Next, required_role: &str) -> Response {
    let allowed = match request.extensions().get::<Claims>() {
        Some(claims) => claims.has_role(required_role),
        None => return ApiError::Unauthorized("未认证".to_string()).into_response(),
    };

    if allowed {
        next.run(request).await
    } else {
        ApiError::Forbidden(format!("缺少角色: {}", required_role)).into_response()
    }
}
