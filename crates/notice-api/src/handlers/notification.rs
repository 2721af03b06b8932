//! 通知 API 处理器
//!
//! 通知的创建、查询与删除

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notice_service::{NoticeError, NotificationRecord, NotificationRequest};
use tracing::info;
use validator::Validate;

use crate::{
    auth::Claims,
    dto::{CreateNotificationRequest, ScheduleResponse},
    error::{ApiError, Result},
    state::AppState,
};

/// 创建通知并投递给楼栋全部成员
///
/// POST /api/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    payload: std::result::Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<Json<ScheduleResponse>> {
    let Some(Extension(claims)) = claims else {
        return Err(ApiError::Unauthorized("未认证".to_string()));
    };
    let Json(req) = payload?;
    req.validate()?;

    let request = NotificationRequest::new(req.building_id, req.notice, claims.username)?;
    let outcome = state.dispatcher.create(request).await?;

    info!(
        notification_id = outcome.notification_id,
        success_count = outcome.success_count,
        recipient_count = outcome.recipient_count,
        "通知已创建"
    );

    Ok(Json(ScheduleResponse::scheduled(outcome.success_count)))
}

/// 获取全部通知（需要 admin 角色）
///
/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<NotificationRecord>>> {
    let records = state.dispatcher.list_all().await?;
    Ok(Json(records))
}

/// 获取楼栋的通知
///
/// GET /api/notifications/building/{building_id}
pub async fn list_building_notifications(
    State(state): State<AppState>,
    building_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<NotificationRecord>>> {
    let Path(building_id) = building_id?;
    let records = state.dispatcher.list_by_building(building_id).await?;
    Ok(Json(records))
}

/// 获取单条通知，不存在时返回空响应体的 404
///
/// GET /api/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Response> {
    let Path(id) = id?;
    match state.dispatcher.get_by_id(id).await {
        Ok(record) => Ok(Json(record).into_response()),
        Err(NoticeError::NotificationNotFound(_)) => Ok(StatusCode::NOT_FOUND.into_response()),
        Err(e) => Err(e.into()),
    }
}

/// 删除通知
///
/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    state.dispatcher.delete_by_id(id).await?;
    info!(notification_id = id, "通知已删除");
    Ok(StatusCode::NO_CONTENT)
}
