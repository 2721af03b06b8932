//! 通知相关实体定义
//!
//! 通知记录只能通过分发流程创建，创建后不可修改，只能整条删除。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NoticeError, Result};

/// 已持久化的通知记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// 存储分配的 ID
    pub id: i64,
    /// 目标楼栋
    pub building_id: i64,
    /// 通知正文
    pub notice: String,
    /// 创建人（认证用户名）
    pub created_by: String,
    /// 创建时间（UTC）
    pub created_date: DateTime<Utc>,
}

/// 待持久化的通知记录（尚未分配 ID）
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub building_id: i64,
    pub notice: String,
    pub created_by: String,
    pub created_date: DateTime<Utc>,
}

impl NewNotification {
    /// 由存储分配 ID 后生成完整记录
    pub fn into_record(self, id: i64) -> NotificationRecord {
        NotificationRecord {
            id,
            building_id: self.building_id,
            notice: self.notice,
            created_by: self.created_by,
            created_date: self.created_date,
        }
    }
}

/// 发起人最大长度，与 notifications.created_by 列宽一致
pub const MAX_REQUESTED_BY_CHARS: usize = 100;

/// 已校验的分发请求
///
/// 只能通过 [`NotificationRequest::new`] 构造，持有实例即意味着输入合法。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    building_id: i64,
    notice: String,
    requested_by: String,
}

impl NotificationRequest {
    /// 校验并创建分发请求
    ///
    /// - `building_id` 必须为正整数
    /// - `notice` 不能为空，仅含空白字符视为空
    /// - `requested_by` 不能为空，且不超过 [`MAX_REQUESTED_BY_CHARS`] 个字符
    pub fn new(
        building_id: i64,
        notice: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Result<Self> {
        let notice = notice.into();
        let requested_by = requested_by.into();

        if building_id <= 0 {
            return Err(NoticeError::Validation(format!(
                "buildingId 必须为正整数: {building_id}"
            )));
        }
        if notice.trim().is_empty() {
            return Err(NoticeError::Validation("notice 不能为空".to_string()));
        }
        if requested_by.trim().is_empty() {
            return Err(NoticeError::Validation("requestedBy 不能为空".to_string()));
        }
        if requested_by.chars().count() > MAX_REQUESTED_BY_CHARS {
            return Err(NoticeError::Validation(format!(
                "requestedBy 长度不能超过 {MAX_REQUESTED_BY_CHARS} 个字符"
            )));
        }

        Ok(Self {
            building_id,
            notice,
            requested_by,
        })
    }

    pub fn building_id(&self) -> i64 {
        self.building_id
    }

    pub fn notice(&self) -> &str {
        &self.notice
    }

    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }

    /// 生成待持久化记录，创建时间取当前服务器时间
    pub fn to_new_notification(&self) -> NewNotification {
        NewNotification {
            building_id: self.building_id,
            notice: self.notice.clone(),
            created_by: self.requested_by.clone(),
            created_date: Utc::now(),
        }
    }
}

/// 一次分发的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    /// 持久化后的通知 ID
    pub notification_id: i64,
    /// 解析到的收件人数
    pub recipient_count: usize,
    /// 投递成功数
    pub success_count: usize,
}

impl DispatchOutcome {
    /// 投递失败数
    pub fn failure_count(&self) -> usize {
        self.recipient_count - self.success_count
    }

    /// 是否全部投递成功（无收件人时视为成功）
    pub fn is_complete(&self) -> bool {
        self.success_count == self.recipient_count
    }

    /// 是否部分成功
    pub fn is_partial_success(&self) -> bool {
        self.success_count > 0 && self.success_count < self.recipient_count
    }
}
