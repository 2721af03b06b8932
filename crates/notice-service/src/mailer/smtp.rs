//! SMTP Mailer
//!
//! 基于 lettre 的异步 SMTP 投递。传输在构造时建立一次，发送时复用连接池。

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use notice_shared::config::MailerConfig;
use tracing::{debug, warn};

use super::{DeliveryError, Mailer};
use crate::error::{NoticeError, Result};
use crate::models::Recipient;

const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP Mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// 按配置创建
    ///
    /// 需要 `smtp_host`；用户名和密码同时配置时才启用认证。
    pub fn new(config: &MailerConfig) -> Result<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| NoticeError::Config("缺少 mailer.smtp_host".to_string()))?;

        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| NoticeError::Config(format!("发件人地址无效: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| NoticeError::Config(e.to_string()))?
            .port(config.smtp_port.unwrap_or(DEFAULT_SMTP_PORT))
            .timeout(Some(Duration::from_millis(config.timeout_ms)));

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// 构建邮件，不涉及网络
    fn build_message(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> std::result::Result<Message, DeliveryError> {
        let to: Mailbox = recipient
            .email
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(recipient.email.clone()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> std::result::Result<String, DeliveryError> {
        let message = self.build_message(recipient, subject, body)?;

        match self.transport.send(message).await {
            Ok(response) => {
                let message_id: Vec<&str> = response.message().collect();
                debug!(to = %recipient.email, code = %response.code(), "SMTP 投递成功");
                Ok(message_id.join(" "))
            }
            Err(e) => {
                warn!(to = %recipient.email, error = %e, "SMTP 投递失败");
                Err(DeliveryError::Transport(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailerConfig {
        MailerConfig {
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_username: Some("user".to_string()),
            smtp_password: Some("pass".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_host() {
        let err = SmtpMailer::new(&MailerConfig::default()).err().unwrap();
        assert!(matches!(err, NoticeError::Config(_)));
    }

    #[test]
    fn test_new_rejects_bad_from_address() {
        let config = MailerConfig {
            from_address: "not an address".to_string(),
            ..config()
        };
        assert!(matches!(SmtpMailer::new(&config), Err(NoticeError::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_network() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let err = mailer
            .send(&Recipient::new("broken", "no-at-sign"), "Notification", "hi")
            .await
            .unwrap_err();

        assert_eq!(err, DeliveryError::InvalidAddress("no-at-sign".to_string()));
    }

    #[test]
    fn test_build_message() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let message = mailer
            .build_message(
                &Recipient::new("resident-a", "a@example.com"),
                "Notification",
                "Water shut-off",
            )
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Notification"));
        assert!(formatted.contains("To: a@example.com"));
    }
}
