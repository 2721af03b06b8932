//! 通知分发器
//!
//! 串联楼栋目录、邮件发送与记录存储：
//!
//! 1. 解析楼栋收件人
//! 2. 并发向每个收件人发送邮件，单个失败不影响其他收件人
//! 3. 所有发送结束后统计成功数
//! 4. 持久化一条通知记录
//!
//! 分发器本身不持有跨调用的状态，多个 create 可以并发执行。

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use notice_shared::config::{DispatchConfig, MailerConfig};
use notice_shared::observability::metrics;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{NoticeError, Result};
use crate::mailer::{DeliveryError, Mailer};
use crate::models::{DispatchOutcome, NotificationRecord, NotificationRequest, Recipient};
use crate::repository::{NotificationStore, RecipientDirectory};

/// 分发参数
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// 邮件主题
    pub subject: String,
    /// 单次分发的并发发送上限
    pub max_concurrent_sends: usize,
    /// 单个收件人发送超时
    pub send_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default(), &MailerConfig::default())
    }
}

impl DispatchSettings {
    pub fn from_config(dispatch: &DispatchConfig, mailer: &MailerConfig) -> Self {
        Self {
            subject: mailer.subject.clone(),
            max_concurrent_sends: dispatch.max_concurrent_sends.max(1),
            send_timeout: Duration::from_millis(dispatch.send_timeout_ms),
        }
    }
}

/// 单个收件人的投递结果
#[derive(Debug)]
struct DeliveryReport {
    login: String,
    result: std::result::Result<String, DeliveryError>,
}

/// 通知分发器
pub struct NotificationDispatcher {
    directory: Arc<dyn RecipientDirectory>,
    mailer: Arc<dyn Mailer>,
    store: Arc<dyn NotificationStore>,
    settings: DispatchSettings,
}

impl NotificationDispatcher {
    pub fn new(
        directory: Arc<dyn RecipientDirectory>,
        mailer: Arc<dyn Mailer>,
        store: Arc<dyn NotificationStore>,
        settings: DispatchSettings,
    ) -> Self {
        info!(
            mailer = mailer.name(),
            max_concurrent_sends = settings.max_concurrent_sends,
            send_timeout_ms = settings.send_timeout.as_millis() as u64,
            "通知分发器已初始化"
        );
        Self {
            directory,
            mailer,
            store,
            settings,
        }
    }

    /// 创建并分发通知
    ///
    /// 请求在构造时已完成校验。楼栋不存在时不发送任何邮件也不写记录；
    /// 邮件发送失败只影响成功计数；记录写入失败返回 `Persistence`，
    /// 此时邮件可能已经发出。
    #[instrument(
        skip(self, request),
        fields(
            building_id = request.building_id(),
            requested_by = %request.requested_by()
        )
    )]
    pub async fn create(&self, request: NotificationRequest) -> Result<DispatchOutcome> {
        let start = Instant::now();
        let result = self.dispatch(&request).await;

        let label = match &result {
            Ok(_) => "ok",
            Err(e) => e.metric_label(),
        };
        metrics::record_dispatch(label, start.elapsed());

        result
    }

    async fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchOutcome> {
        let recipients = self.directory.resolve(request.building_id()).await?;
        let recipient_count = recipients.len();

        if recipients.is_empty() {
            info!("楼栋没有收件人，仅保存通知记录");
        } else {
            debug!(recipient_count, "开始投递");
        }

        let reports = self.deliver_all(&recipients, request.notice()).await;
        let success_count = self.tally(&reports);

        let new_notification = request.to_new_notification();
        let record = self.store.save(&new_notification).await.map_err(|e| {
            error!(
                error = %e,
                recipient_count,
                success_count,
                "邮件已发出但通知记录保存失败"
            );
            NoticeError::Persistence(e.to_string())
        })?;

        let outcome = DispatchOutcome {
            notification_id: record.id,
            recipient_count,
            success_count,
        };
        self.log_outcome(&outcome);

        Ok(outcome)
    }

    /// 并发投递，受并发上限与单次超时约束；所有投递结束后才返回
    async fn deliver_all(&self, recipients: &[Recipient], body: &str) -> Vec<DeliveryReport> {
        // 先收集 future 再入流，create 的 future 才能满足 Send（axum handler / tokio::spawn）
        let deliveries: Vec<_> = recipients
            .iter()
            .map(|recipient| self.deliver(recipient, body))
            .collect();

        stream::iter(deliveries)
            .buffer_unordered(self.settings.max_concurrent_sends)
            .collect()
            .await
    }

    async fn deliver(&self, recipient: &Recipient, body: &str) -> DeliveryReport {
        let send = self.mailer.send(recipient, &self.settings.subject, body);
        let result = match tokio::time::timeout(self.settings.send_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(
                self.settings.send_timeout.as_millis() as u64,
            )),
        };

        DeliveryReport {
            login: recipient.login.clone(),
            result,
        }
    }

    fn tally(&self, reports: &[DeliveryReport]) -> usize {
        let mut delivered = 0usize;
        for report in reports {
            match &report.result {
                Ok(message_id) => {
                    delivered += 1;
                    debug!(login = %report.login, message_id = %message_id, "投递成功");
                }
                Err(e) => {
                    warn!(login = %report.login, error = %e, "投递失败");
                }
            }
        }

        let failed = reports.len() - delivered;
        metrics::record_deliveries(delivered as u64, failed as u64);
        delivered
    }

    fn log_outcome(&self, outcome: &DispatchOutcome) {
        if outcome.is_complete() {
            info!(
                notification_id = outcome.notification_id,
                recipient_count = outcome.recipient_count,
                "通知分发完成"
            );
        } else if outcome.is_partial_success() {
            warn!(
                notification_id = outcome.notification_id,
                success_count = outcome.success_count,
                failure_count = outcome.failure_count(),
                "通知部分投递成功"
            );
        } else {
            error!(
                notification_id = outcome.notification_id,
                recipient_count = outcome.recipient_count,
                "通知全部投递失败"
            );
        }
    }

    /// 查询全部通知
    pub async fn list_all(&self) -> Result<Vec<NotificationRecord>> {
        self.store.find_all().await
    }

    /// 查询楼栋的通知
    pub async fn list_by_building(&self, building_id: i64) -> Result<Vec<NotificationRecord>> {
        self.store.find_by_building(building_id).await
    }

    /// 按 ID 查询通知
    pub async fn get_by_id(&self, id: i64) -> Result<NotificationRecord> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(NoticeError::NotificationNotFound(id))
    }

    /// 删除通知
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<()> {
        if self.store.delete(id).await? {
            info!("通知已删除");
            Ok(())
        } else {
            Err(NoticeError::NotificationNotFound(id))
        }
    }

    /// 存储健康检查
    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}
