use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    cache::{TimingsCacheOperations, keys},
    routes::{timings::model::validate_coords, validation_error},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{HealthResponse, InvalidateRequest, InvalidateResponse};

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let redis = match state.redis.get_multiplexed_async_connection().await {
        Ok(mut conn) => {
            let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
            match pong {
                Ok(_) => "up",
                Err(e) => {
                    tracing::warn!("Redis ping failed: {}", e);
                    "down"
                }
            }
        }
        Err(e) => {
            tracing::warn!("Redis connection failed: {}", e);
            "down"
        }
    };

    (
        StatusCode::OK,
        success_to_api_response(HealthResponse { status: "ok", redis }),
    )
}

/// 按位置失效缓存：删除该位置所有日期和计算方法的条目
#[axum::debug_handler]
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> impl IntoResponse {
    let pattern = match (req.latitude, req.longitude, &req.city, &req.country) {
        (Some(latitude), Some(longitude), _, _) => {
            if let Err(msg) = validate_coords(latitude, longitude) {
                return validation_error(msg);
            }
            keys::coords_location_pattern(latitude, longitude)
        }
        (None, None, Some(city), Some(country)) => {
            if city.trim().is_empty() || country.trim().is_empty() {
                return validation_error("city和country不能为空".to_string());
            }
            keys::city_location_pattern(city, country)
        }
        _ => {
            return validation_error("需要完整的坐标对或者城市/国家对".to_string());
        }
    };

    match TimingsCacheOperations::invalidate_location(&state.redis, &pattern).await {
        Ok(removed) => {
            tracing::info!("Invalidated {} cache entries matching {}", removed, pattern);
            (
                StatusCode::OK,
                success_to_api_response(InvalidateResponse { removed }),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
        ),
    }
}
