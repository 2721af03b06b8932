//! PostgreSQL 连接池
//!
//! 按配置建立连接池，并在启动时按需执行 `migrations/` 下的内嵌迁移。

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// 数据库连接池包装
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 建立连接池；`run_migrations` 开启时随后执行迁移
    #[instrument(skip_all, fields(max_connections = config.max_connections))]
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = pool_options(config).connect(&config.url).await?;
        let db = Self { pool };
        info!("Database connection pool created");

        if config.run_migrations {
            sqlx::migrate!("../../migrations").run(&db.pool).await?;
            info!("Database migrations applied");
        }

        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 等待在用连接归还后关闭
    pub async fn close(self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}
