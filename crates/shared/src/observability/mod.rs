//! 可观测性
//!
//! 日志、分布式追踪与 Prometheus 指标的初始化入口。
//!
//! - [`tracing`]: 日志格式、过滤级别与可选的 OTLP 导出
//! - [`metrics`]: 独立端口上的 `/metrics` 以及分发相关的记录函数
//! - [`middleware`]: 请求 ID 与 HTTP 请求指标

pub mod metrics;
pub mod middleware;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// `[observability]` 配置段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 追踪资源与指标中的服务名，留空时取顶层 `service_name`
    pub service_name: String,
    /// OTLP gRPC 端点，未设置则只输出本地日志
    pub otlp_endpoint: Option<String>,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
    /// `RUST_LOG` 未设置时使用的过滤级别
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            otlp_endpoint: None,
            metrics_enabled: true,
            metrics_port: 9090,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// 持有追踪 provider 与指标服务；drop 时刷新并关闭追踪导出
#[must_use = "dropping the guard shuts down tracing export"]
pub struct ObservabilityGuard {
    _tracing: tracing::TracingGuard,
    _metrics: Option<metrics::MetricsHandle>,
}

/// 先装好日志订阅者，再按 `metrics_enabled` 启动指标端口
pub async fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    let tracing_guard = tracing::init(config)?;

    let metrics_handle = if config.metrics_enabled {
        Some(metrics::init(config).await?)
    } else {
        None
    };

    info!(
        service = %config.service_name,
        otlp_endpoint = ?config.otlp_endpoint,
        metrics_port = ?config.metrics_enabled.then_some(config.metrics_port),
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}
