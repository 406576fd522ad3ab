use serde::{Deserialize, Serialize};

/// 克尔白的坐标，朝向计算的终点
pub const KAABA_LATITUDE: f64 = 21.422487;
pub const KAABA_LONGITUDE: f64 = 39.826206;

#[derive(Debug, Deserialize)]
pub struct QiblaQuery {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct QiblaResponse {
    pub latitude: f64,
    pub longitude: f64,
    /// 朝向角度，正北为0，顺时针，[0, 360)
    pub direction: f64,
}

/// 从给定位置到克尔白的大圆初始方位角
pub fn qibla_direction(latitude: f64, longitude: f64) -> f64 {
    let lat = latitude.to_radians();
    let kaaba_lat = KAABA_LATITUDE.to_radians();
    let delta_lon = (KAABA_LONGITUDE - longitude).to_radians();

    let y = delta_lon.sin() * kaaba_lat.cos();
    let x = lat.cos() * kaaba_lat.sin() - lat.sin() * kaaba_lat.cos() * delta_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1.0,
            "expected ~{}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn qibla_from_london_points_southeast() {
        assert_close(qibla_direction(51.5074, -0.1278), 119.0);
    }

    #[test]
    fn qibla_from_new_york_points_northeast() {
        assert_close(qibla_direction(40.7128, -74.0060), 58.5);
    }

    #[test]
    fn qibla_from_jakarta_points_northwest() {
        assert_close(qibla_direction(-6.2088, 106.8456), 295.0);
    }

    #[test]
    fn qibla_due_north_of_kaaba_points_south() {
        assert_close(qibla_direction(31.0, KAABA_LONGITUDE), 180.0);
    }

    #[test]
    fn direction_is_always_normalized() {
        for &(lat, lon) in &[
            (51.5, -0.13),
            (-33.87, 151.21),
            (40.71, -74.0),
            (64.15, -21.94),
        ] {
            let direction = qibla_direction(lat, lon);
            assert!((0.0..360.0).contains(&direction));
        }
    }
}
