use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures_util::future::join_all;
use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::CacheError;
use crate::cache::keys;
use crate::cache::models::{CachedConversion, CachedTimings, PrayerTimesRecord};

/// 经度推算的UTC偏移（小时）。上游只给时区名不给数值偏移，
/// 这里用经度近似，误差最多一小时左右，对至多存活一天的条目可接受
pub fn local_day_offset_hours(longitude: f64) -> i32 {
    ((longitude / 15.0).round() as i32).clamp(-12, 14)
}

/// 查询日期在当地结束的时刻（UTC）
pub fn end_of_local_day(date: NaiveDate, longitude: f64) -> DateTime<Utc> {
    let offset = local_day_offset_hours(longitude);
    let next_local_midnight = date
        .succ_opt()
        .expect("valid date")
        .and_hms_opt(0, 0, 0)
        .expect("valid timestamp");
    Utc.from_utc_datetime(&(next_local_midnight - chrono::Duration::hours(offset as i64)))
}

/// 到当地日期结束为止的TTL。日期已经过去则返回None，
/// 保证条目绝不活过它描述的那一天
pub fn day_aligned_ttl(date: NaiveDate, longitude: f64, now: DateTime<Utc>) -> Option<u64> {
    let remaining = (end_of_local_day(date, longitude) - now).num_seconds();
    if remaining <= 0 {
        None
    } else {
        Some(remaining as u64)
    }
}

/// 礼拜时间缓存操作
pub struct TimingsCacheOperations;

impl TimingsCacheOperations {
    /// 读取缓存条目，命中时递增旁边的命中计数
    pub async fn get_timings(
        redis: &Arc<RedisClient>,
        key: &str,
    ) -> Result<Option<CachedTimings>, CacheError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(key).await?;
        match result {
            Some(json) => {
                let cached: CachedTimings = serde_json::from_str(&json)?;

                let hits_key = keys::hits_key(key);
                let hits: u32 = conn.incr(&hits_key, 1).await?;
                if hits == 1 {
                    // 首次命中，计数键的存活期对齐条目剩余TTL
                    let remaining: i64 = conn.ttl(key).await?;
                    if remaining > 0 {
                        let _: () = conn.expire(&hits_key, remaining).await?;
                    }
                }

                Ok(Some(cached))
            }
            None => Ok(None),
        }
    }

    /// 写入缓存条目，TTL对齐当地日期结束时刻。
    /// 日期在当地已经结束时跳过写入，返回false
    pub async fn cache_timings(
        redis: &Arc<RedisClient>,
        key: &str,
        record: &PrayerTimesRecord,
        date: NaiveDate,
        longitude: f64,
    ) -> Result<bool, CacheError> {
        let now = Utc::now();
        let Some(ttl) = day_aligned_ttl(date, longitude, now) else {
            tracing::debug!("Skipping cache write for {}: local day already ended", key);
            return Ok(false);
        };

        let entry = CachedTimings {
            record: record.clone(),
            cached_at: now.timestamp(),
            expires_at: end_of_local_day(date, longitude).timestamp(),
        };
        let json = serde_json::to_string(&entry)?;

        let mut conn = redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, json, ttl).await?;

        Ok(true)
    }

    /// 把整月的条目并发写入缓存，返回实际写入数。
    /// 单日失败只记日志，不影响其它日期
    pub async fn cache_month(
        redis: &Arc<RedisClient>,
        longitude: f64,
        entries: Vec<(String, PrayerTimesRecord, NaiveDate)>,
    ) -> usize {
        let results = join_all(entries.iter().map(|(key, record, date)| async move {
            Self::cache_timings(redis, key, record, *date, longitude).await
        }))
        .await;

        let mut cached = 0;
        for (result, (key, _, _)) in results.into_iter().zip(&entries) {
            match result {
                Ok(true) => cached += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Failed to back-fill cache entry {}: {}", key, e),
            }
        }
        cached
    }

    /// 按位置失效：SCAN匹配位置前缀，删除条目和命中计数，
    /// 返回删除的条目数（不含计数键）
    pub async fn invalidate_location(
        redis: &Arc<RedisClient>,
        pattern: &str,
    ) -> Result<u64, CacheError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        if keys.is_empty() {
            return Ok(0);
        }

        let removed = keys.iter().filter(|k| !k.ends_with(":hits")).count() as u64;
        let _: () = conn.del(&keys).await?;

        Ok(removed)
    }

    /// 读取缓存的公历转回历结果
    pub async fn get_conversion(
        redis: &Arc<RedisClient>,
        date: NaiveDate,
    ) -> Result<Option<CachedConversion>, CacheError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(keys::conversion_key(date)).await?;
        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 写入公历转回历结果，固定TTL
    pub async fn cache_conversion(
        redis: &Arc<RedisClient>,
        date: NaiveDate,
        conversion: &CachedConversion,
        ttl: u64,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(conversion)?;

        let mut conn = redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(keys::conversion_key(date), json, ttl).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn offset_follows_longitude() {
        assert_eq!(local_day_offset_hours(0.0), 0);
        assert_eq!(local_day_offset_hours(39.83), 3); // 麦加
        assert_eq!(local_day_offset_hours(-77.04), -5); // 利马
        assert_eq!(local_day_offset_hours(106.85), 7); // 雅加达
    }

    #[test]
    fn offset_is_clamped_at_extremes() {
        assert_eq!(local_day_offset_hours(179.9), 12);
        assert_eq!(local_day_offset_hours(-179.9), -12);
    }

    #[test]
    fn end_of_day_at_greenwich_is_next_utc_midnight() {
        let end = end_of_local_day(date(2024, 4, 24), 0.0);
        assert_eq!(end, utc(2024, 4, 25, 0, 0));
    }

    #[test]
    fn end_of_day_shifts_with_longitude() {
        // 东三区的一天在UTC 21:00结束
        let end = end_of_local_day(date(2024, 4, 24), 39.83);
        assert_eq!(end, utc(2024, 4, 24, 21, 0));

        // 西五区的一天在次日UTC 05:00结束
        let end = end_of_local_day(date(2024, 4, 24), -77.04);
        assert_eq!(end, utc(2024, 4, 25, 5, 0));
    }

    #[test]
    fn ttl_counts_down_to_end_of_local_day() {
        let now = utc(2024, 4, 24, 12, 0);
        assert_eq!(day_aligned_ttl(date(2024, 4, 24), 0.0, now), Some(12 * 3600));
    }

    #[test]
    fn ttl_is_none_for_elapsed_dates() {
        let now = utc(2024, 4, 25, 1, 0);
        assert_eq!(day_aligned_ttl(date(2024, 4, 24), 0.0, now), None);
        // 昨天的日期在东边更早结束
        assert_eq!(day_aligned_ttl(date(2024, 4, 24), 39.83, now), None);
    }

    #[test]
    fn ttl_respects_local_boundary_not_utc() {
        // UTC已经是25日，但西五区的24日还没结束
        let now = utc(2024, 4, 25, 3, 0);
        assert_eq!(
            day_aligned_ttl(date(2024, 4, 24), -77.04, now),
            Some(2 * 3600)
        );
    }

    #[test]
    fn entry_never_outlives_its_date() {
        let now = utc(2024, 4, 24, 23, 30);
        let ttl = day_aligned_ttl(date(2024, 4, 24), 0.0, now).unwrap();
        let expiry = now + chrono::Duration::seconds(ttl as i64);
        assert!(expiry <= end_of_local_day(date(2024, 4, 24), 0.0));
    }
}
