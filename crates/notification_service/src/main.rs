//! Notification service entry point.
//!
//! Accepts notification requests over HTTP, delivers them through the
//! simulated channel and exposes history and statistics.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use notification_service::{
    create_router, AppState, DeliverySimulator, NotificationDispatcher, SimulatorConfig,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting notification service...");

    // Configuration from environment
    let http_port: u16 = env::var("HTTP_PORT")
        .unwrap_or_else(|_| "8083".into())
        .parse()?;
    let metrics_port: u16 = env::var("METRICS_PORT")
        .unwrap_or_else(|_| "9093".into())
        .parse()?;
    let service_name =
        env::var("APP_NAME").unwrap_or_else(|_| "notification-service".into());
    let version = env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".into());

    let defaults = SimulatorConfig::default();
    let simulator_config = SimulatorConfig {
        success_rate: match env::var("DELIVERY_SUCCESS_RATE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.success_rate,
        },
        min_delay: match env::var("DELIVERY_MIN_DELAY_MS") {
            Ok(v) => Duration::from_millis(v.parse()?),
            Err(_) => defaults.min_delay,
        },
        max_delay: match env::var("DELIVERY_MAX_DELAY_MS") {
            Ok(v) => Duration::from_millis(v.parse()?),
            Err(_) => defaults.max_delay,
        },
    };

    info!("Configuration:");
    info!("  HTTP_PORT: {}", http_port);
    info!("  METRICS_PORT: {}", metrics_port);
    info!("  APP_NAME: {}", service_name);
    info!("  DELIVERY_SUCCESS_RATE: {}", simulator_config.success_rate);
    info!(
        "  DELIVERY_DELAY: {:?}..={:?}",
        simulator_config.min_delay, simulator_config.max_delay
    );

    // Start Prometheus metrics server
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics_port))
        .install()?;
    info!("Prometheus metrics server started on port {}", metrics_port);

    let simulator = DeliverySimulator::new(simulator_config)?;
    let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(simulator)));

    let state = Arc::new(AppState {
        dispatcher,
        service_name,
        version,
    });
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Notification service listening on {}", addr);
    info!("Available endpoints:");
    info!("  POST /api/notifications/send");
    info!("  POST /api/notifications/send/batch");
    info!("  GET  /api/notifications/history/{{recipient}}");
    info!("  GET  /api/notifications/statistics");
    info!("  GET  /api/notifications/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Notification service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}
