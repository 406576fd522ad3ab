use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use miqat_backend::{
    AppState,
    config::Config,
    middleware::{RateLimiter, caller_middleware, log_errors, rate_limit, require_service},
    routes,
    upstream::UpstreamClient,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let redis_arc = Arc::new(redis_client.clone());

    // 设置上游客户端
    let upstream = UpstreamClient::new(&config).expect("Failed to create upstream client");

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        redis: redis_arc,
        upstream,
    };

    // 设置限流器
    let rate_limiter = Arc::new(RateLimiter::new(redis_client, config.clone()));

    // 公开路由：健康检查和匿名令牌签发
    let public_routes = Router::new()
        .route("/health", get(routes::admin::health))
        .route("/auth/anonymous", post(routes::auth::create_anonymous));

    // 业务路由，解析调用方身份后放行
    let gateway_routes = Router::new()
        .route("/timings/by-city", get(routes::timings::by_city))
        .route("/timings/by-coords", get(routes::timings::by_coords))
        .route("/calendar/{year}/{month}", get(routes::timings::calendar))
        .route("/hijri/{date}", get(routes::hijri::gregorian_to_hijri))
        .route("/qibla", get(routes::qibla::qibla))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            caller_middleware,
        ));

    // 管理路由，要求service等级
    let admin_routes = Router::new()
        .route("/cache/invalidate", post(routes::admin::invalidate_cache))
        .layer(axum::middleware::from_fn(require_service))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            caller_middleware,
        ));

    // 创建基础路由
    let router = Router::new().nest(
        &config.api_base_uri.clone(),
        Router::new()
            .merge(public_routes)
            .merge(gateway_routes)
            .merge(admin_routes),
    );

    // 添加日志中间件和限流中间件
    let router = router.layer(axum::middleware::from_fn(log_errors)).layer(
        axum::middleware::from_fn_with_state(rate_limiter, rate_limit),
    );

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        // 设置开发环境的CORS，允许所有来源
        let cors = CorsLayer::permissive();
        router.layer(cors)
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
