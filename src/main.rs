use axum::{
    routing::{get, post},
    Router,
};
use pharma_ruptures_rust::{api, create_pool, AppConfig, RuptureEngine};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format, matching the rest of the analytics stack
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    let engine = Arc::new(RuptureEngine::new(pool));

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/ruptures", post(api::analyze_ruptures))
        .with_state(engine)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/ruptures - order-to-reception reconciliation KPIs");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
