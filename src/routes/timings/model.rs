use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::PrayerTimesRecord;

/// 上游支持的计算方法ID。6是上游保留的空位
pub const KNOWN_METHODS: &[u8] = &[
    0, 1, 2, 3, 4, 5, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
    pub country: String,
    pub date: Option<String>,
    pub method: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct CoordsQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub date: Option<String>,
    pub method: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub method: Option<u8>,
}

/// 响应数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Upstream,
}

#[derive(Debug, Serialize)]
pub struct TimingsResponse {
    pub record: PrayerTimesRecord,
    pub source: Source,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<PrayerTimesRecord>,
}

/// 解析查询日期，缺省取今天（UTC）
pub fn parse_query_date(raw: Option<&str>) -> Result<NaiveDate, String> {
    match raw {
        None => Ok(Utc::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%d-%m-%Y")
            .map_err(|_| format!("日期格式无效，应为DD-MM-YYYY: {}", raw)),
    }
}

pub fn validate_coords(latitude: f64, longitude: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("纬度超出范围: {}", latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("经度超出范围: {}", longitude));
    }
    Ok(())
}

pub fn validate_method(method: u8) -> Result<(), String> {
    if KNOWN_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(format!("未知的计算方法: {}", method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_date_accepts_provider_format() {
        let date = parse_query_date(Some("24-04-2024")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 4, 24).unwrap());
    }

    #[test]
    fn parse_query_date_trims_whitespace() {
        assert!(parse_query_date(Some(" 24-04-2024 ")).is_ok());
    }

    #[test]
    fn parse_query_date_rejects_other_formats() {
        assert!(parse_query_date(Some("2024-04-24")).is_err());
        assert!(parse_query_date(Some("24/04/2024")).is_err());
        assert!(parse_query_date(Some("31-02-2024")).is_err());
    }

    #[test]
    fn parse_query_date_defaults_to_today() {
        assert_eq!(parse_query_date(None).unwrap(), Utc::now().date_naive());
    }

    #[test]
    fn coords_validation_rejects_out_of_range() {
        assert!(validate_coords(21.42, 39.83).is_ok());
        assert!(validate_coords(90.0, 180.0).is_ok());
        assert!(validate_coords(90.1, 0.0).is_err());
        assert!(validate_coords(0.0, -180.5).is_err());
    }

    #[test]
    fn method_validation_follows_known_set() {
        assert!(validate_method(2).is_ok());
        assert!(validate_method(23).is_ok());
        assert!(validate_method(6).is_err());
        assert!(validate_method(24).is_err());
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Cache).unwrap(), "\"cache\"");
        assert_eq!(
            serde_json::to_string(&Source::Upstream).unwrap(),
            "\"upstream\""
        );
    }
}
