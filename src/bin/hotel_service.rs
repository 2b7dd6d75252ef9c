use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hotel_guide::{
    app_state::{HealthProbes, HotelState},
    config::AppConfig,
    db::{self, PgHotelRepository},
    routes::{self, health::DatabaseProbe, health::HealthProbe},
    shutdown_signal,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    tracing::info!("Initializing hotel-service");

    let prometheus_handle =
        routes::metrics::install_recorder().expect("Failed to install Prometheus metrics recorder");

    tracing::info!("Connecting to PostgreSQL");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let probes: Vec<Arc<dyn HealthProbe>> = vec![Arc::new(DatabaseProbe(db_pool.clone()))];
    let state = HotelState::new(
        Arc::new(PgHotelRepository::new(db_pool)),
        HealthProbes::new(probes),
    );

    let app = Router::new()
        .merge(routes::hotel_routes(state))
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    let listener = tokio::net::TcpListener::bind(&config.hotel_bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Hotel-service listening on {}", config.hotel_bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Hotel-service stopped");
}
