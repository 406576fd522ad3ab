use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};

use crate::{
    AppState,
    cache::{CachedConversion, TimingsCacheOperations},
    routes::{timings::model::Source, upstream_error_to_response, validation_error},
    utils::success_to_api_response,
};

use super::model::ConversionResponse;

#[axum::debug_handler]
pub async fn gregorian_to_hijri(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> impl IntoResponse {
    let date = match NaiveDate::parse_from_str(date.trim(), "%d-%m-%Y") {
        Ok(date) => date,
        Err(_) => {
            return validation_error(format!("日期格式无效，应为DD-MM-YYYY: {}", date));
        }
    };

    match TimingsCacheOperations::get_conversion(&state.redis, date).await {
        Ok(Some(cached)) => {
            return (
                StatusCode::OK,
                success_to_api_response(ConversionResponse::from_cached(cached, Source::Cache)),
            );
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Conversion cache read failed for {}: {}", date, e),
    }

    match state.upstream.gregorian_to_hijri(date).await {
        Ok(data) => {
            let cached = CachedConversion::from_conversion(&data, Utc::now().timestamp());
            if let Err(e) = TimingsCacheOperations::cache_conversion(
                &state.redis,
                date,
                &cached,
                state.config.hijri_cache_ttl_secs,
            )
            .await
            {
                tracing::warn!("Conversion cache write failed for {}: {}", date, e);
            }
            (
                StatusCode::OK,
                success_to_api_response(ConversionResponse::from_cached(cached, Source::Upstream)),
            )
        }
        Err(e) => upstream_error_to_response(e),
    }
}
