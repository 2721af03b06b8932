//! 楼栋通知服务
//!
//! 提供通知创建、查询、删除的 REST API。

use std::sync::Arc;

use axum::{http::HeaderValue, middleware};
use notice_api::{middleware::security_headers, routes, state::AppState};
use notice_service::{
    DispatchSettings, MemoryNotificationStore, NotificationDispatcher, NotificationStore,
    PgBuildingDirectory, PgNotificationRepository, RecipientDirectory, StaticDirectory,
    build_mailer,
};
use notice_shared::{
    config::{AppConfig, CorsConfig, StorageBackend},
    database::Database,
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const SERVICE_NAME: &str = "notice-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let _guard = observability::init(&config.observability).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let (directory, store, db) = build_storage(&config).await?;
    let mailer = build_mailer(&config.mailer)?;

    let dispatcher = Arc::new(NotificationDispatcher::new(
        directory,
        mailer,
        store,
        DispatchSettings::from_config(&config.dispatch, &config.mailer),
    ));

    let state = AppState::new(dispatcher, &config.auth);

    let app = routes::app(state)
        .layer(middleware::from_fn(security_headers))
        .layer(build_cors(&config.cors, config.is_production()))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到 SIGTERM 或 Ctrl+C 后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }

    info!("Server shutdown complete");

    Ok(())
}

/// 按存储后端构建楼栋目录和通知存储
async fn build_storage(
    config: &AppConfig,
) -> anyhow::Result<(
    Arc<dyn RecipientDirectory>,
    Arc<dyn NotificationStore>,
    Option<Database>,
)> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::open(&config.database).await?;

            let directory: Arc<dyn RecipientDirectory> =
                Arc::new(PgBuildingDirectory::new(db.pool().clone()));
            let store: Arc<dyn NotificationStore> =
                Arc::new(PgNotificationRepository::new(db.pool().clone()));
            Ok((directory, store, Some(db)))
        }
        StorageBackend::Memory => {
            let seeded = StaticDirectory::from_seeds(&config.storage.buildings);
            warn!(
                buildings = seeded.building_count(),
                "Using in-memory storage, notifications are lost on restart"
            );
            let directory: Arc<dyn RecipientDirectory> = Arc::new(seeded);
            let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
            Ok((directory, store, None))
        }
    }
}

/// CORS 配置："*" 放开全部来源，否则按逗号分隔的列表匹配
fn build_cors(cors: &CorsConfig, production: bool) -> CorsLayer {
    if cors.allowed_origins == "*" {
        if production {
            warn!("cors.allowed_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", cors.allowed_origins);
        let origins: Vec<_> = cors
            .allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 任一信号后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
