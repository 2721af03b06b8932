//! 日志与分布式追踪
//!
//! 本地日志总是开启；配置 `otlp_endpoint` 后 span 同时经 OTLP/gRPC 导出。

use anyhow::Result;
use opentelemetry::trace::{TraceContextExt, TracerProvider as _};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{Sampler, SdkTracerProvider},
};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::ObservabilityConfig;

/// 持有 OTLP provider，drop 时刷新尚未导出的 span
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush spans on shutdown: {e}");
            }
        }
    }
}

/// `RUST_LOG` 优先；配置值无法解析时退回 info
fn build_env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(config: &ObservabilityConfig) -> Result<TracingGuard> {
    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| otlp_provider(&config.service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|p| {
        tracing_opentelemetry::layer().with_tracer(p.tracer(config.service_name.clone()))
    });

    // json 与文本格式二选一，未选中的一侧为 None
    let json_layer = config.json_logs.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
    });
    let text_layer = (!config.json_logs).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(build_env_filter(&config.log_level))
        .with(json_layer)
        .with(text_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(TracingGuard { provider })
}

fn otlp_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build();

    opentelemetry::global::set_tracer_provider(provider.clone());
    Ok(provider)
}

/// 当前 span 的 trace ID，未接入 OTLP 或不在 span 内时为 None
pub fn current_trace_id() -> Option<String> {
    let context = tracing::Span::current().context();
    let span_context = context.span().span_context().clone();
    span_context
        .is_valid()
        .then(|| span_context.trace_id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_trace_id_without_init() {
        assert!(current_trace_id().is_none());
    }

    #[test]
    fn test_env_filter_accepts_bad_directive() {
        let _ = build_env_filter("not a [valid] directive ===");
        let _ = build_env_filter("notice_service=debug,info");
    }
}
