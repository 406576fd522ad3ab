use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// 调用方等级，决定限流配额
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerTier {
    Anonymous,
    Registered,
    Service,
}

impl CallerTier {
    /// 返回该等级在一个窗口内允许的请求数
    pub fn quota(&self, config: &Config) -> u32 {
        match self {
            CallerTier::Anonymous => config.rate_limit_anonymous,
            CallerTier::Registered => config.rate_limit_registered,
            CallerTier::Service => config.rate_limit_service,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // 调用方ID
    pub exp: i64,         // 过期时间
    pub iat: i64,         // 签发时间
    pub tier: CallerTier, // 调用方等级
}

pub fn generate_token(
    caller_id: &str,
    tier: CallerTier,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let lifetime = match tier {
        CallerTier::Anonymous => config.anon_token_expiration(),
        _ => config.jwt_expiration(),
    };
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(lifetime.as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: caller_id.to_string(),
        exp: expiration,
        iat: Utc::now().timestamp(),
        tier,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

/// 生成匿名调用方的临时令牌，返回 (调用方ID, 令牌, 过期时间)
pub fn generate_anonymous_token(
    config: &Config,
) -> Result<(String, String, i64), jsonwebtoken::errors::Error> {
    let caller_id = Uuid::new_v4().to_string();
    let (token, expiration) = generate_token(&caller_id, CallerTier::Anonymous, config)?;
    Ok((caller_id, token, expiration))
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// 通用的API响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 错误码，0表示成功，非0表示失败
    pub code: i32,
    /// 错误消息，成功时为"success"
    pub msg: String,
    /// 响应数据，错误时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 0,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const UPSTREAM_REJECTED: i32 = 1006;
    pub const UPSTREAM_UNAVAILABLE: i32 = 1007;
    pub const INTERNAL_ERROR: i32 = 5000;
}
