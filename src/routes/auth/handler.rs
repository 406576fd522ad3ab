use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    AppState,
    utils::{
        CallerTier, error_codes, error_to_api_response, generate_anonymous_token,
        success_to_api_response,
    },
};

use super::model::AnonymousTokenResponse;

/// 给移动端签发一个匿名调用方令牌，纯声明式，不落库
#[axum::debug_handler]
pub async fn create_anonymous(State(state): State<AppState>) -> impl IntoResponse {
    match generate_anonymous_token(&state.config) {
        Ok((caller_id, token, expires_at)) => {
            tracing::debug!("Issued anonymous token for caller {}", caller_id);
            (
                StatusCode::OK,
                success_to_api_response(AnonymousTokenResponse {
                    caller_id,
                    token,
                    tier: CallerTier::Anonymous,
                    expires_at,
                }),
            )
        }
        Err(_) => (
            StatusCode::OK,
            error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
        ),
    }
}
