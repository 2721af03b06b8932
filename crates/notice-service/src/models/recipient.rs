//! 收件人

use serde::{Deserialize, Serialize};

/// 楼栋成员，即一条通知的收件人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// 登录名
    pub login: String,
    /// 邮箱地址
    pub email: String,
}

impl Recipient {
    pub fn new(login: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            email: email.into(),
        }
    }
}
