use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState,
    middleware::rate_limit::client_ip,
    utils::{CallerTier, error_codes, error_to_api_response, verify_token},
};

/// 从请求解析出的调用方身份，作为extension传给后续处理
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub caller_id: String,
    pub tier: CallerTier,
}

/// 概念性令牌检查：带有效令牌的请求取声明里的身份，
/// 无令牌按匿名处理（以IP区分），令牌无效直接拒绝
pub async fn caller_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let identity = match bearer {
        Some(TypedHeader(auth)) => match verify_token(auth.token(), &state.config) {
            Ok(claims) => CallerIdentity {
                caller_id: claims.sub,
                tier: claims.tier,
            },
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                return Ok((
                    StatusCode::UNAUTHORIZED,
                    error_to_api_response::<()>(
                        error_codes::AUTH_FAILED,
                        "令牌无效或已过期".to_string(),
                    ),
                )
                    .into_response());
            }
        },
        None => CallerIdentity {
            caller_id: format!("ip:{}", client_ip(&req)),
            tier: CallerTier::Anonymous,
        },
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// 管理路由的等级守卫，只放行service等级的调用方
pub async fn require_service(
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match req.extensions().get::<CallerIdentity>() {
        Some(identity) if identity.tier == CallerTier::Service => Ok(next.run(req).await),
        Some(identity) => {
            tracing::debug!(
                "Caller {} denied: tier {:?} is not service",
                identity.caller_id,
                identity.tier
            );
            Ok((
                StatusCode::FORBIDDEN,
                error_to_api_response::<()>(
                    error_codes::PERMISSION_DENIED,
                    "需要service等级的令牌".to_string(),
                ),
            )
                .into_response())
        }
        None => Ok((
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(error_codes::AUTH_FAILED, "缺少调用方身份".to_string()),
        )
            .into_response()),
    }
}
