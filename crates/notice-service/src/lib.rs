//! 楼栋通知服务
//!
//! 为楼栋创建通知、向楼栋成员发送邮件，并保存通知记录。
//!
//! ## 核心功能
//!
//! - **通知分发**：解析楼栋收件人，并发投递邮件，统计成功数
//! - **记录管理**：按全部、楼栋、ID 查询通知，按 ID 删除
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 通知存储与楼栋目录
//! - `mailer`: 邮件发送方式
//! - `dispatcher`: 通知分发器

pub mod dispatcher;
pub mod error;
pub mod mailer;
pub mod models;
pub mod repository;

pub use dispatcher::{DispatchSettings, NotificationDispatcher};
pub use error::{NoticeError, Result};
pub use mailer::{DeliveryError, Mailer, build_mailer};
pub use models::{DispatchOutcome, NewNotification, NotificationRecord, NotificationRequest, Recipient};
pub use repository::{
    MemoryNotificationStore, NotificationStore, PgBuildingDirectory, PgNotificationRepository,
    RecipientDirectory, StaticDirectory,
};
