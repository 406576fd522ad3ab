use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub anon_token_expiration_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_anonymous: u32,
    pub rate_limit_registered: u32,
    pub rate_limit_service: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub upstream_base_url: String,
    pub upstream_timeout_secs: u64,
    pub upstream_retries: u32,
    pub upstream_retry_backoff_ms: u64,
    pub default_method: u8,
    pub hijri_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        let anon_token_expiration = env::var("ANON_TOKEN_EXPIRATION")?
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(1);
        Ok(Config {
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api/v1".to_string()),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            anon_token_expiration_secs: anon_token_expiration * 3600,
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")?.parse().unwrap_or(60),
            rate_limit_anonymous: env::var("RATE_LIMIT_ANONYMOUS")?.parse().unwrap_or(30),
            rate_limit_registered: env::var("RATE_LIMIT_REGISTERED")?.parse().unwrap_or(120),
            rate_limit_service: env::var("RATE_LIMIT_SERVICE")?.parse().unwrap_or(1200),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://api.aladhan.com/v1".to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT")?.parse().unwrap_or(10),
            upstream_retries: env::var("UPSTREAM_RETRIES")?.parse().unwrap_or(2),
            upstream_retry_backoff_ms: env::var("UPSTREAM_RETRY_BACKOFF_MS")?
                .parse()
                .unwrap_or(250),
            default_method: env::var("DEFAULT_METHOD")?.parse().unwrap_or(2),
            hijri_cache_ttl_secs: env::var("HIJRI_CACHE_TTL")?.parse().unwrap_or(86400),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn anon_token_expiration(&self) -> Duration {
        Duration::from_secs(self.anon_token_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
