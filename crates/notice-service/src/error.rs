//! 通知服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

use crate::mailer::DeliveryError;

/// 通知服务错误类型
#[derive(Debug, Error)]
pub enum NoticeError {
    // === 业务错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("楼栋不存在: {0}")]
    BuildingNotFound(i64),

    #[error("通知不存在: {0}")]
    NotificationNotFound(i64),

    // === 投递与持久化 ===
    /// 单个收件人投递失败，只在分发内部计数，不会作为 create 的结果返回
    #[error("邮件投递失败: {0}")]
    Delivery(#[from] DeliveryError),

    /// 邮件已发出但通知记录写入失败
    #[error("通知记录持久化失败: {0}")]
    Persistence(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 通知服务 Result 类型别名
pub type Result<T> = std::result::Result<T, NoticeError>;

impl NoticeError {
    /// 指标标签
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::BuildingNotFound(_) | Self::NotificationNotFound(_) => "not_found",
            Self::Persistence(_) => "persistence",
            _ => "error",
        }
    }
}
