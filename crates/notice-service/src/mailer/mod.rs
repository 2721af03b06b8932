//! 邮件发送
//!
//! 定义 Mailer trait 并提供各发送方式的实现。
//!
//! ## 支持的发送方式
//!
//! - **SMTP**: 通过 SMTP 中继直接投递
//! - **HTTP**: 通过 HTTP 邮件中继服务投递
//! - **Log**: 只写日志，开发环境默认

mod http_relay;
mod log;
mod smtp;

pub use http_relay::HttpRelayMailer;
pub use log::LogMailer;
pub use smtp::SmtpMailer;

use std::sync::Arc;

use async_trait::async_trait;
use notice_shared::config::{MailTransport, MailerConfig};
use thiserror::Error;

use crate::error::Result;
use crate::models::Recipient;

/// 单个收件人的投递错误
///
/// 只在分发内部计入失败数，不会中断其他收件人的投递。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("收件人地址无效: {0}")]
    InvalidAddress(String),

    #[error("邮件构建失败: {0}")]
    Build(String),

    #[error("传输失败: {0}")]
    Transport(String),

    #[error("中继拒绝投递: status={status}, body={body}")]
    Rejected { status: u16, body: String },

    #[error("投递超时: {0}ms")]
    Timeout(u64),
}

/// 邮件发送 trait
///
/// 一次调用只投递给一个收件人。实现应当是无状态的，便于并发调用。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// 发送方式名称（用于日志）
    fn name(&self) -> &'static str;

    /// 投递一封邮件，成功时返回消息 ID
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> std::result::Result<String, DeliveryError>;
}

/// 按配置创建 Mailer
pub fn build_mailer(config: &MailerConfig) -> Result<Arc<dyn Mailer>> {
    let mailer: Arc<dyn Mailer> = match config.transport {
        MailTransport::Smtp => Arc::new(SmtpMailer::new(config)?),
        MailTransport::Http => Arc::new(HttpRelayMailer::new(config)?),
        MailTransport::Log => Arc::new(LogMailer::new(&config.from_address)),
    };
    Ok(mailer)
}
