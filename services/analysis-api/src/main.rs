//! Analysis API server
//!
//! Zonal statistics over tiled rasters, clipped to user geometries.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use analysis_api::handlers;
use analysis_api::state::{AppState, DEFAULT_MAX_AREA_HA};

/// Analysis API Server
#[derive(Parser, Debug)]
#[command(name = "analysis-api")]
#[command(about = "Zonal statistics server for tiled raster data")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8090", env = "ANALYSIS_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Geostore service base URL
    #[arg(
        long,
        default_value = "http://localhost:9010",
        env = "GEOSTORE_URL"
    )]
    geostore_url: String,

    /// Maximum geometry area in hectares for the direct analysis path
    #[arg(long, default_value_t = DEFAULT_MAX_AREA_HA, env = "ANALYSIS_MAX_AREA_HA")]
    max_area_ha: f64,

    /// Number of worker threads
    #[arg(long, env = "ANALYSIS_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .expect("Failed to create Tokio runtime");

    runtime.block_on(async move {
        run_server(args).await;
    });
}

async fn run_server(args: Args) {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting analysis API server");

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    // Initialize application state
    let state = match AppState::from_env(args.geostore_url, args.max_area_ha, metrics) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    // Build router
    let app = Router::new()
        .route("/analysis", post(handlers::analysis::analysis_handler))
        .route(
            "/analysis/treecoverloss",
            get(handlers::analysis::tree_cover_loss_handler),
        )
        .route(
            "/analysis/gladalerts",
            get(handlers::analysis::glad_alerts_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    // Parse listen address
    let addr: SocketAddr = args.listen.parse().expect("Invalid listen address");

    info!("Analysis API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server failed");
}
