//! 中间件模块
//!
//! 提供认证、角色检查和安全头中间件

mod auth;
mod role;
mod security;

pub use auth::auth_middleware;
pub use role::require_role;
pub use security::security_headers;
