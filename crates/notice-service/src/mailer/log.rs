//! 日志 Mailer
//!
//! 不实际发送邮件，只记录日志并返回成功。用于开发环境。

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{DeliveryError, Mailer};
use crate::models::Recipient;

/// 日志 Mailer
#[derive(Debug, Clone)]
pub struct LogMailer {
    from_address: String,
}

impl LogMailer {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<String, DeliveryError> {
        let message_id = format!("log_{}", Uuid::now_v7());

        info!(
            message_id = %message_id,
            from = %self.from_address,
            to = %recipient.email,
            login = %recipient.login,
            subject = %subject,
            body_len = body.len(),
            "模拟发送邮件"
        );

        Ok(message_id)
    }
}
