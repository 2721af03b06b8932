//! 楼栋通知 REST 服务
//!
//! 对外提供通知的创建、查询与删除接口。
//!
//! ## 模块结构
//!
//! - `auth`: JWT Token 生成与验证
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: HTTP 错误类型
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证、角色检查、安全头中间件
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;
