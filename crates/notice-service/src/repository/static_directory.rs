//! 静态楼栋目录
//!
//! 从配置中的楼栋种子数据构建，用于 memory 存储后端和测试。

use std::collections::HashMap;

use async_trait::async_trait;
use notice_shared::config::BuildingSeed;

use super::traits::RecipientDirectory;
use crate::error::{NoticeError, Result};
use crate::models::Recipient;

/// 静态楼栋目录
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    buildings: HashMap<i64, Vec<Recipient>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置种子构建
    pub fn from_seeds(seeds: &[BuildingSeed]) -> Self {
        let buildings = seeds
            .iter()
            .map(|seed| {
                let members = seed
                    .members
                    .iter()
                    .map(|m| Recipient::new(&m.login, &m.email))
                    .collect();
                (seed.id, members)
            })
            .collect();

        Self { buildings }
    }

    /// 添加（或替换）一个楼栋
    pub fn with_building(mut self, building_id: i64, recipients: Vec<Recipient>) -> Self {
        self.buildings.insert(building_id, recipients);
        self
    }

    /// 已登记的楼栋数
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn resolve(&self, building_id: i64) -> Result<Vec<Recipient>> {
        self.buildings
            .get(&building_id)
            .cloned()
            .ok_or(NoticeError::BuildingNotFound(building_id))
    }
}
