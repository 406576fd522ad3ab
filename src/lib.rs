use config::Config;
use redis::Client as RedisClient;
use std::sync::Arc;
use upstream::UpstreamClient;

pub mod cache;
pub mod config;
pub mod middleware;
pub mod upstream;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub upstream: UpstreamClient,
}
