use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::models::{ConversionData, Envelope, TimingsData};
use crate::config::Config;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream rejected the request: {status} (code {code})")]
    Api { code: i32, status: String },

    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    /// 传输错误和5xx可以重试，4xx和解码错误不行
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Transport(_) => true,
            UpstreamError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// 上游礼拜时间接口的客户端，带超时和重试
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    retries: u32,
    backoff_ms: u64,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.upstream_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            retries: config.upstream_retries,
            backoff_ms: config.upstream_retry_backoff_ms,
        })
    }

    pub async fn timings_by_city(
        &self,
        date: NaiveDate,
        city: &str,
        country: &str,
        method: u8,
    ) -> Result<TimingsData, UpstreamError> {
        let path = format!("/timingsByCity/{}", date.format("%d-%m-%Y"));
        self.get_json(
            &path,
            &[
                ("city", city.to_string()),
                ("country", country.to_string()),
                ("method", method.to_string()),
            ],
        )
        .await
    }

    pub async fn timings_by_coords(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        method: u8,
    ) -> Result<TimingsData, UpstreamError> {
        let path = format!("/timings/{}", date.format("%d-%m-%Y"));
        self.get_json(
            &path,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("method", method.to_string()),
            ],
        )
        .await
    }

    pub async fn calendar(
        &self,
        year: i32,
        month: u32,
        latitude: f64,
        longitude: f64,
        method: u8,
    ) -> Result<Vec<TimingsData>, UpstreamError> {
        let path = format!("/calendar/{}/{}", year, month);
        self.get_json(
            &path,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("method", method.to_string()),
            ],
        )
        .await
    }

    pub async fn gregorian_to_hijri(
        &self,
        date: NaiveDate,
    ) -> Result<ConversionData, UpstreamError> {
        let path = format!("/gToH/{}", date.format("%d-%m-%Y"));
        self.get_json(&path, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0u32;
        loop {
            match self.fetch(&url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    let delay = Duration::from_millis(self.backoff_ms << attempt);
                    tracing::warn!(
                        "Upstream request to {} failed (attempt {}): {}, retrying in {:?}",
                        url,
                        attempt + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let response = self.client.get(url).query(query).send().await?;
        let http_status = response.status();
        let body = response.text().await?;

        if http_status.is_server_error() {
            return Err(UpstreamError::Status(http_status.as_u16()));
        }

        // 信封里的code比HTTP状态码更可靠
        let envelope: Envelope<serde_json::Value> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !http_status.is_success() => {
                return Err(UpstreamError::Status(http_status.as_u16()));
            }
            Err(e) => return Err(UpstreamError::Decode(e)),
        };
        if envelope.code != 200 {
            return Err(UpstreamError::Api {
                code: envelope.code,
                status: envelope.status,
            });
        }

        Ok(serde_json::from_value(envelope.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(UpstreamError::Status(500).is_retryable());
        assert!(UpstreamError::Status(503).is_retryable());
    }

    #[test]
    fn client_errors_are_terminal() {
        assert!(!UpstreamError::Status(400).is_retryable());
        assert!(!UpstreamError::Status(404).is_retryable());
        let api = UpstreamError::Api {
            code: 400,
            status: "BAD_REQUEST".into(),
        };
        assert!(!api.is_retryable());
    }

    #[test]
    fn decode_errors_are_terminal() {
        let err: serde_json::Error = serde_json::from_str::<Envelope<()>>("not json").unwrap_err();
        assert!(!UpstreamError::Decode(err).is_retryable());
    }
}
