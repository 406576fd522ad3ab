// 上游服务模块
// 包含第三方礼拜时间接口的客户端和响应数据结构

pub mod client;
pub mod models;

pub use client::{UpstreamClient, UpstreamError};
pub use models::{ConversionData, Envelope, HijriDate, TimingsData};
