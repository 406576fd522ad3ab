use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;

use crate::{
    AppState,
    cache::{PrayerTimesRecord, TimingsCacheOperations, keys},
    routes::{upstream_error_to_response, validation_error},
    utils::success_to_api_response,
};

use super::model::{
    CalendarQuery, CalendarResponse, CityQuery, CoordsQuery, Source, TimingsResponse,
    parse_query_date, validate_coords, validate_method,
};

#[axum::debug_handler]
pub async fn by_city(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> impl IntoResponse {
    if query.city.trim().is_empty() || query.country.trim().is_empty() {
        return validation_error("city和country不能为空".to_string());
    }
    let method = query.method.unwrap_or(state.config.default_method);
    if let Err(msg) = validate_method(method) {
        return validation_error(msg);
    }
    let date = match parse_query_date(query.date.as_deref()) {
        Ok(date) => date,
        Err(msg) => return validation_error(msg),
    };

    let key = keys::city_timings_key(&query.city, &query.country, method, date);

    // 缓存读失败只降级，不影响请求
    match TimingsCacheOperations::get_timings(&state.redis, &key).await {
        Ok(Some(cached)) => {
            tracing::info!("Cache hit for {}", key);
            return (
                StatusCode::OK,
                success_to_api_response(TimingsResponse {
                    record: cached.record,
                    source: Source::Cache,
                }),
            );
        }
        Ok(None) => tracing::info!("Cache miss for {}", key),
        Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
    }

    match state
        .upstream
        .timings_by_city(date, &query.city, &query.country, method)
        .await
    {
        Ok(data) => {
            let record = PrayerTimesRecord::from(&data);
            // 日界对齐用上游解析出来的坐标
            if let Err(e) = TimingsCacheOperations::cache_timings(
                &state.redis,
                &key,
                &record,
                date,
                data.meta.longitude,
            )
            .await
            {
                tracing::warn!("Cache write failed for {}: {}", key, e);
            }
            (
                StatusCode::OK,
                success_to_api_response(TimingsResponse {
                    record,
                    source: Source::Upstream,
                }),
            )
        }
        Err(e) => upstream_error_to_response(e),
    }
}

#[axum::debug_handler]
pub async fn by_coords(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> impl IntoResponse {
    if let Err(msg) = validate_coords(query.latitude, query.longitude) {
        return validation_error(msg);
    }
    let method = query.method.unwrap_or(state.config.default_method);
    if let Err(msg) = validate_method(method) {
        return validation_error(msg);
    }
    let date = match parse_query_date(query.date.as_deref()) {
        Ok(date) => date,
        Err(msg) => return validation_error(msg),
    };

    let key = keys::coords_timings_key(query.latitude, query.longitude, method, date);

    match TimingsCacheOperations::get_timings(&state.redis, &key).await {
        Ok(Some(cached)) => {
            tracing::info!("Cache hit for {}", key);
            return (
                StatusCode::OK,
                success_to_api_response(TimingsResponse {
                    record: cached.record,
                    source: Source::Cache,
                }),
            );
        }
        Ok(None) => tracing::info!("Cache miss for {}", key),
        Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
    }

    match state
        .upstream
        .timings_by_coords(date, query.latitude, query.longitude, method)
        .await
    {
        Ok(data) => {
            let record = PrayerTimesRecord::from(&data);
            if let Err(e) = TimingsCacheOperations::cache_timings(
                &state.redis,
                &key,
                &record,
                date,
                data.meta.longitude,
            )
            .await
            {
                tracing::warn!("Cache write failed for {}: {}", key, e);
            }
            (
                StatusCode::OK,
                success_to_api_response(TimingsResponse {
                    record,
                    source: Source::Upstream,
                }),
            )
        }
        Err(e) => upstream_error_to_response(e),
    }
}

#[axum::debug_handler]
pub async fn calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<CalendarQuery>,
) -> impl IntoResponse {
    if year < 1 || !(1..=12).contains(&month) {
        return validation_error(format!("无效的年月: {}/{}", year, month));
    }
    if let Err(msg) = validate_coords(query.latitude, query.longitude) {
        return validation_error(msg);
    }
    let method = query.method.unwrap_or(state.config.default_method);
    if let Err(msg) = validate_method(method) {
        return validation_error(msg);
    }

    match state
        .upstream
        .calendar(year, month, query.latitude, query.longitude, method)
        .await
    {
        Ok(days) => {
            let records: Vec<PrayerTimesRecord> =
                days.iter().map(PrayerTimesRecord::from).collect();

            // 回填每日缓存，后续的单日查询可以直接命中
            let entries: Vec<(String, PrayerTimesRecord, NaiveDate)> = days
                .iter()
                .zip(&records)
                .filter_map(|(day, record)| {
                    let date =
                        NaiveDate::parse_from_str(&day.date.gregorian.date, "%d-%m-%Y").ok()?;
                    let key =
                        keys::coords_timings_key(query.latitude, query.longitude, method, date);
                    Some((key, record.clone(), date))
                })
                .collect();
            let redis = state.redis.clone();
            let longitude = query.longitude;
            tokio::spawn(async move {
                let cached = TimingsCacheOperations::cache_month(&redis, longitude, entries).await;
                tracing::info!(
                    "Back-filled {} daily entries from calendar {}/{}",
                    cached,
                    year,
                    month
                );
            });

            (
                StatusCode::OK,
                success_to_api_response(CalendarResponse {
                    year,
                    month,
                    days: records,
                }),
            )
        }
        Err(e) => upstream_error_to_response(e),
    }
}
