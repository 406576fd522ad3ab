use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;
use sha2::{Digest, Sha256};

use crate::{
    config::Config,
    utils::{CallerTier, error_codes, error_to_api_response, verify_token},
};

#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    config: Arc<Config>,
}

/// 滑动窗口的加权计数：当前桶全算，上一个桶按剩余占比折算
pub fn weighted_count(prev: u32, curr: u32, elapsed: f64) -> f64 {
    curr as f64 + prev as f64 * (1.0 - elapsed)
}

/// 无效令牌按令牌指纹限流，避免换着错误令牌刷请求
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("tok:{}", &digest[..16])
}

/// 从请求头取客户端IP，拿不到时退回连接信息里的IP
pub(crate) fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());
    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or_else(|| remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: Config) -> Self {
        Self {
            redis: Arc::new(redis),
            config: Arc::new(config),
        }
    }

    /// 解析限流身份：有效令牌用声明的sub和等级，
    /// 无效令牌按指纹算匿名，无令牌按IP算匿名
    fn resolve_caller(&self, req: &Request<Body>) -> (String, CallerTier) {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        match token {
            Some(token) => match verify_token(token, &self.config) {
                Ok(claims) => (claims.sub, claims.tier),
                Err(_) => (token_fingerprint(token), CallerTier::Anonymous),
            },
            None => (format!("ip:{}", client_ip(req)), CallerTier::Anonymous),
        }
    }

    pub async fn check_rate_limit(
        self: Arc<Self>,
        req: Request<Body>,
        next: Next,
    ) -> Result<Response, StatusCode> {
        let (caller_id, tier) = self.resolve_caller(&req);

        let window = self.config.rate_limit_window_secs;
        let now = chrono::Utc::now().timestamp() as u64;
        let window_index = now / window;
        let elapsed = (now % window) as f64 / window as f64;

        let curr_key = format!("rate:{}:{}", caller_id, window_index);
        let prev_key = format!("rate:{}:{}", caller_id, window_index.saturating_sub(1));

        let mut conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        // 当前桶用 INCR + EXPIRE 计数，留两个窗口的存活期供折算
        let curr: u32 = conn
            .incr(&curr_key, 1)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        if curr == 1 {
            let _: () = conn
                .expire(&curr_key, (2 * window) as i64)
                .await
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        }

        let prev: Option<u32> = conn
            .get(&prev_key)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let weighted = weighted_count(prev.unwrap_or(0), curr, elapsed);
        let quota = tier.quota(&self.config);

        if weighted > quota as f64 {
            let retry_after = window - now % window;
            tracing::info!(
                "Rate limit exceeded for {} (tier {:?}): {:.1} > {}",
                caller_id,
                tier,
                weighted,
                quota
            );
            return Ok((
                StatusCode::OK,
                error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!("请求过于频繁，请在{}秒后重试", retry_after),
                ),
            )
                .into_response());
        }

        Ok(next.run(req).await)
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    limiter.check_rate_limit(req, next).await
}
