//! 数据访问层
//!
//! 通知存储（Store）与楼栋目录（Directory）的接口及实现。
//!
//! - PostgreSQL 实现用于生产环境
//! - 内存实现用于本地开发和测试
//! - 分发器只依赖 trait，具体实现在启动时按配置注入

mod directory_repo;
mod memory_store;
mod notification_repo;
mod static_directory;
mod traits;

pub use directory_repo::PgBuildingDirectory;
pub use memory_store::MemoryNotificationStore;
pub use notification_repo::PgNotificationRepository;
pub use static_directory::StaticDirectory;
pub use traits::*;
