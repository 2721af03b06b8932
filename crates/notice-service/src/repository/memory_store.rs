//! 内存通知存储
//!
//! 使用 DashMap 实现的并发内存存储，适用于测试和开发环境。
//! 进程重启后数据丢失。

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::traits::NotificationStore;
use crate::error::Result;
use crate::models::{NewNotification, NotificationRecord};

/// 内存通知存储
///
/// ID 由原子计数器从 1 开始递增分配，删除后不复用。
#[derive(Debug)]
pub struct MemoryNotificationStore {
    records: DashMap<i64, NotificationRecord>,
    next_id: AtomicI64,
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// 当前记录数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按 ID 升序收集满足条件的记录
    fn collect_sorted<F>(&self, predicate: F) -> Vec<NotificationRecord>
    where
        F: Fn(&NotificationRecord) -> bool,
    {
        let mut records: Vec<NotificationRecord> = self
            .records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn save(&self, notification: &NewNotification) -> Result<NotificationRecord> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = notification.clone().into_record(id);
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<NotificationRecord>> {
        Ok(self.collect_sorted(|_| true))
    }

    async fn find_by_building(&self, building_id: i64) -> Result<Vec<NotificationRecord>> {
        Ok(self.collect_sorted(|r| r.building_id == building_id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<NotificationRecord>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
