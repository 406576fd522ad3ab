use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// 按坐标缓存的礼拜时间键前缀
const TIMINGS_COORDS_PREFIX: &str = "timings:coords:";

/// 按城市缓存的礼拜时间键前缀
const TIMINGS_CITY_PREFIX: &str = "timings:city:";

/// 公历转回历结果的键前缀
const HIJRI_CONVERSION_PREFIX: &str = "hijri:gtoh:";

/// 坐标归一化：保留两位小数（约1.1公里），避免浮点噪声打散缓存键
pub fn normalize_coord(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // 归一化掉 -0.00
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}", rounded)
}

/// 城市/国家归一化后取哈希，自由文本也能产生稳定且有界的键
pub fn city_hash(city: &str, country: &str) -> String {
    let normalized = format!(
        "{}|{}",
        city.trim().to_lowercase(),
        country.trim().to_lowercase()
    );
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// 生成按坐标查询的缓存键，位置段在前便于按位置失效
pub fn coords_timings_key(latitude: f64, longitude: f64, method: u8, date: NaiveDate) -> String {
    format!(
        "{}{}:{}:{}:{}",
        TIMINGS_COORDS_PREFIX,
        normalize_coord(latitude),
        normalize_coord(longitude),
        method,
        date.format("%d-%m-%Y")
    )
}

/// 生成按城市查询的缓存键
pub fn city_timings_key(city: &str, country: &str, method: u8, date: NaiveDate) -> String {
    format!(
        "{}{}:{}:{}",
        TIMINGS_CITY_PREFIX,
        city_hash(city, country),
        method,
        date.format("%d-%m-%Y")
    )
}

/// 匹配某个坐标位置全部缓存条目的模式
pub fn coords_location_pattern(latitude: f64, longitude: f64) -> String {
    format!(
        "{}{}:{}:*",
        TIMINGS_COORDS_PREFIX,
        normalize_coord(latitude),
        normalize_coord(longitude)
    )
}

/// 匹配某个城市全部缓存条目的模式
pub fn city_location_pattern(city: &str, country: &str) -> String {
    format!("{}{}:*", TIMINGS_CITY_PREFIX, city_hash(city, country))
}

/// 缓存条目旁边的命中计数键
pub fn hits_key(entry_key: &str) -> String {
    format!("{}:hits", entry_key)
}

/// 生成公历转回历结果的缓存键
pub fn conversion_key(date: NaiveDate) -> String {
    format!("{}{}", HIJRI_CONVERSION_PREFIX, date.format("%d-%m-%Y"))
}
