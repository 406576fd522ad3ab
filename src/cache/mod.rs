// 缓存模块
// 包含缓存键生成、数据结构和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;

use thiserror::Error;

pub use models::{CachedConversion, CachedTimings, PrayerTimesRecord};
pub use operations::TimingsCacheOperations;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
