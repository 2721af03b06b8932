//! JWT 签发与校验
//!
//! 通知的创建人取自 Token 中的 `username`；角色用于限制全量查询。

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use notice_shared::config::AuthConfig;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// 拥有全部权限的角色
pub const ADMIN_ROLE: &str = "admin";

/// Token 载荷
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    /// 通知创建人
    pub username: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role || r == ADMIN_ROLE)
    }
}

/// 按 `[auth]` 配置签发并校验 HS256 Token
#[derive(Clone)]
pub struct JwtManager {
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);

        Self {
            issuer: config.issuer.clone(),
            ttl: Duration::seconds(config.expires_in_secs),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// 签发 Token，返回 Token 与过期时间戳
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        roles: Vec<String>,
    ) -> Result<(String, i64), ApiError> {
        let issued_at = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("JWT 生成失败: {e}")))?;
        Ok((token, claims.exp))
    }

    /// 校验签名、签发者与有效期
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token 已过期".to_string(),
                    ErrorKind::InvalidIssuer => "Token 签发者不匹配".to_string(),
                    ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                        "无效的 Token".to_string()
                    }
                    _ => format!("Token 验证失败: {e}"),
                };
                ApiError::Unauthorized(reason)
            })
    }
}
