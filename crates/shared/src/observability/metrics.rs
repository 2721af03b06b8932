//! Prometheus 指标
//!
//! 记录函数在未安装 recorder 时为空操作，测试与禁用指标的部署可以直接调用。

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

use super::ObservabilityConfig;

/// 指标名
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
    pub const DISPATCHES_TOTAL: &str = "notice_dispatches_total";
    pub const DISPATCH_DURATION_SECONDS: &str = "notice_dispatch_duration_seconds";
    pub const DELIVERIES_TOTAL: &str = "notice_deliveries_total";
}

/// 指标端口的后台任务，drop 时随进程退出
pub struct MetricsHandle {
    _server: JoinHandle<()>,
}

/// 安装全局 recorder，并在 `metrics_port` 上提供 `/metrics`
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .install_recorder()?;
    describe_all();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Metrics endpoint listening");

    Ok(MetricsHandle {
        _server: tokio::spawn(serve(listener, handle)),
    })
}

fn describe_all() {
    describe_counter!(names::HTTP_REQUESTS_TOTAL, "HTTP requests by route template and status");
    describe_histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request latency by route template"
    );
    describe_counter!(names::DISPATCHES_TOTAL, "Notice dispatches by result");
    describe_histogram!(
        names::DISPATCH_DURATION_SECONDS,
        "Time from recipient lookup to the notification record being saved"
    );
    describe_counter!(
        names::DELIVERIES_TOTAL,
        "Per-recipient email deliveries by result"
    );
}

async fn serve(listener: TcpListener, handle: PrometheusHandle) {
    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Metrics endpoint stopped");
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// 记录一次 HTTP 请求；`route` 必须是路由模板而非实际路径
pub fn record_http_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => route.to_string(),
        "status" => status.to_string(),
        "status_class" => status_class(status)
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => route.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// 记录一次通知分发，`result` 为 ok / validation / not_found / persistence / error
pub fn record_dispatch(result: &'static str, elapsed: Duration) {
    counter!(names::DISPATCHES_TOTAL, "result" => result).increment(1);
    histogram!(names::DISPATCH_DURATION_SECONDS, "result" => result)
        .record(elapsed.as_secs_f64());
}

/// 记录一次分发中各收件人的投递结果
pub fn record_deliveries(delivered: u64, failed: u64) {
    counter!(names::DELIVERIES_TOTAL, "result" => "delivered").increment(delivered);
    counter!(names::DELIVERIES_TOTAL, "result" => "failed").increment(failed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(204), "2xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(42), "other");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/api/notifications", 200, Duration::from_millis(100));
        record_dispatch("ok", Duration::from_millis(200));
        record_deliveries(3, 1);
    }
}
