use serde::{Deserialize, Serialize};

/// 失效请求：坐标对和城市/国家对二选一
#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub redis: &'static str,
}
