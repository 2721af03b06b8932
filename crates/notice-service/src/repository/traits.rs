//! 仓储 Trait 定义
//!
//! 分发器依赖这些抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewNotification, NotificationRecord, Recipient};

/// 通知记录存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// 持久化一条新记录，返回分配了 ID 的完整记录
    async fn save(&self, notification: &NewNotification) -> Result<NotificationRecord>;
    async fn find_all(&self) -> Result<Vec<NotificationRecord>>;
    async fn find_by_building(&self, building_id: i64) -> Result<Vec<NotificationRecord>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationRecord>>;
    /// 删除记录，记录不存在时返回 false
    async fn delete(&self, id: i64) -> Result<bool>;
    /// 存储可用性检查（就绪探针使用）
    async fn health_check(&self) -> Result<()>;
}

/// 楼栋目录接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// 解析楼栋的全部收件人
    ///
    /// 楼栋不存在时返回 `BuildingNotFound`；楼栋存在但没有成员时返回空列表。
    async fn resolve(&self, building_id: i64) -> Result<Vec<Recipient>>;
}
