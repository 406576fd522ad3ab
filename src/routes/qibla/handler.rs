use axum::{extract::Query, http::StatusCode, response::IntoResponse};

use crate::{
    routes::{timings::model::validate_coords, validation_error},
    utils::success_to_api_response,
};

use super::model::{QiblaQuery, QiblaResponse, qibla_direction};

/// 朝向是纯函数计算，不经过缓存也不经过上游
#[axum::debug_handler]
pub async fn qibla(Query(query): Query<QiblaQuery>) -> impl IntoResponse {
    if let Err(msg) = validate_coords(query.latitude, query.longitude) {
        return validation_error(msg);
    }

    let direction = qibla_direction(query.latitude, query.longitude);
    (
        StatusCode::OK,
        success_to_api_response(QiblaResponse {
            latitude: query.latitude,
            longitude: query.longitude,
            direction,
        }),
    )
}
