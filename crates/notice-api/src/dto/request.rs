//! 请求 DTO 定义

use serde::Deserialize;
use validator::Validate;

/// 创建通知请求
///
/// 创建人不由客户端提交，取自认证 Token
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[validate(range(min = 1, message = "楼栋 ID 必须为正整数"))]
    pub building_id: i64,
    #[validate(length(min = 1, message = "通知内容不能为空"))]
    pub notice: String,
}
