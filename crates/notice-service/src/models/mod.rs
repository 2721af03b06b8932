//! 通知服务领域模型
//!
//! 通知记录、分发请求与收件人

pub mod notification;
pub mod recipient;

// 重新导出常用类型
pub use notification::{DispatchOutcome, NewNotification, NotificationRecord, NotificationRequest};
pub use recipient::Recipient;
