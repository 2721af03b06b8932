//! HTTP 中继 Mailer
//!
//! 以 JSON POST 的方式把邮件交给 HTTP 邮件中继服务。

use std::time::Duration;

use async_trait::async_trait;
use notice_shared::config::MailerConfig;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{DeliveryError, Mailer};
use crate::error::{NoticeError, Result};
use crate::models::Recipient;

/// 中继返回的消息 ID 头
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// HTTP 中继 Mailer
pub struct HttpRelayMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from_address: String,
}

impl HttpRelayMailer {
    /// 按配置创建，需要 `http_endpoint`
    pub fn new(config: &MailerConfig) -> Result<Self> {
        let endpoint = config
            .http_endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| NoticeError::Config("缺少 mailer.http_endpoint".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NoticeError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.http_api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> std::result::Result<String, DeliveryError> {
        if !recipient.email.contains('@') {
            return Err(DeliveryError::InvalidAddress(recipient.email.clone()));
        }

        let payload = json!({
            "from": self.from_address,
            "to": recipient.email,
            "subject": subject,
            "text": body,
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(to = %recipient.email, error = %e, "邮件中继请求失败");
            DeliveryError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .headers()
                .get(MESSAGE_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
                .unwrap_or_else(|| format!("relay_{}", Uuid::now_v7()));

            debug!(to = %recipient.email, message_id = %message_id, "邮件中继投递成功");
            Ok(message_id)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(to = %recipient.email, status = status.as_u16(), "邮件中继拒绝投递");
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
