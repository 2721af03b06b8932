//! 响应 DTO 定义

use serde::{Deserialize, Serialize};

/// 创建通知的响应
///
/// 只给出投递成功的收件人数，不暴露单个收件人的失败详情
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub message: String,
}

impl ScheduleResponse {
    pub fn scheduled(success_count: usize) -> Self {
        Self {
            message: format!(
                "Notice is successfully scheduled to {} recipients",
                success_count
            ),
        }
    }
}
