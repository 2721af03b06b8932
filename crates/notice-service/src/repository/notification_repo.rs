//! 通知记录仓储（PostgreSQL）

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::traits::NotificationStore;
use crate::error::Result;
use crate::models::{NewNotification, NotificationRecord};

/// 通知记录仓储
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationRepository {
    #[instrument(skip(self, notification), fields(building_id = notification.building_id))]
    async fn save(&self, notification: &NewNotification) -> Result<NotificationRecord> {
        let record = sqlx::query_as::<_, NotificationRecord>(
            r#"
            INSERT INTO notifications (building_id, notice, created_by, created_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, building_id, notice, created_by, created_date
            "#,
        )
        .bind(notification.building_id)
        .bind(&notification.notice)
        .bind(&notification.created_by)
        .bind(notification.created_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<NotificationRecord>> {
        let records = sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, building_id, notice, created_by, created_date
            FROM notifications
            ORDER BY created_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_by_building(&self, building_id: i64) -> Result<Vec<NotificationRecord>> {
        let records = sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, building_id, notice, created_by, created_date
            FROM notifications
            WHERE building_id = $1
            ORDER BY created_date DESC, id DESC
            "#,
        )
        .bind(building_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationRecord>> {
        let record = sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, building_id, notice, created_by, created_date
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
