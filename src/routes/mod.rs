pub mod admin;
pub mod auth;
pub mod hijri;
pub mod qibla;
pub mod timings;

use axum::{Json, http::StatusCode};

use crate::upstream::UpstreamError;
use crate::utils::{ApiResponse, error_codes, error_to_api_response};

/// 把上游错误映射成统一的响应信封。
/// 上游明确拒绝（4xx信封）返回1006，网络/5xx耗尽重试返回1007
pub(crate) fn upstream_error_to_response<T>(err: UpstreamError) -> (StatusCode, Json<ApiResponse<T>>) {
    match err {
        UpstreamError::Api { code, status } => (
            StatusCode::OK,
            error_to_api_response(
                error_codes::UPSTREAM_REJECTED,
                format!("上游拒绝了请求: {} (code {})", status, code),
            ),
        ),
        other => {
            tracing::error!("Upstream request failed: {}", other);
            (
                StatusCode::BAD_GATEWAY,
                error_to_api_response(
                    error_codes::UPSTREAM_UNAVAILABLE,
                    "上游服务暂时不可用".to_string(),
                ),
            )
        }
    }
}

pub(crate) fn validation_error<T>(msg: String) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::OK,
        error_to_api_response(error_codes::VALIDATION_ERROR, msg),
    )
}
