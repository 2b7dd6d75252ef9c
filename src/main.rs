use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hotel_guide::{
    app_state::{HealthProbes, ReportState},
    config::AppConfig,
    db::{self, PgHotelRepository, PgReportRepository},
    routes::{self, health::DatabaseProbe, health::HealthProbe},
    services::{
        consumer::ReportConsumer,
        queue::RedisQueue,
        report::ReportService,
        stats::{HttpStatsResolver, LocalStatsResolver, StatsResolver},
    },
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

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing report service");

    let prometheus_handle =
        routes::metrics::install_recorder().expect("Failed to install Prometheus metrics recorder");

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let redis_url = config
        .require_redis_url()
        .expect("Report service needs a report queue");

    tracing::info!(queue = %config.report_queue, "Connecting to Redis report queue");
    let queue = Arc::new(
        RedisQueue::connect(redis_url, &config.report_queue, config.queue_poll_timeout())
            .await
            .expect("Failed to connect to report queue"),
    );
    queue
        .ensure_ready()
        .await
        .expect("Failed to reach report queue");

    let stats: Arc<dyn StatsResolver> = match &config.hotel_service_url {
        Some(url) => {
            tracing::info!(hotel_service_url = %url, "Resolving location stats via hotel-service");
            Arc::new(
                HttpStatsResolver::new(url, config.stats_timeout())
                    .expect("Failed to initialize hotel-service client"),
            )
        }
        None => {
            tracing::info!("Resolving location stats from local hotel tables");
            Arc::new(LocalStatsResolver::new(Arc::new(PgHotelRepository::new(
                db_pool.clone(),
            ))))
        }
    };

    let reports = Arc::new(PgReportRepository::new(db_pool.clone()));

    // Consume report requests for the lifetime of the process
    let consumer = ReportConsumer::new(reports.clone(), queue.clone(), stats).spawn();

    let probes: Vec<Arc<dyn HealthProbe>> = vec![Arc::new(DatabaseProbe(db_pool)), queue.clone()];
    let state = ReportState::new(
        ReportService::new(reports, queue),
        HealthProbes::new(probes),
    );

    let app = Router::new()
        .merge(routes::report_routes(state))
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Report service listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // In-flight requests are dropped; their reports stay pending.
    consumer.abort();
    tracing::info!("Report service stopped");
}
