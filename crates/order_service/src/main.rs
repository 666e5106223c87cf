//! Order service entry point.
//!
//! Manages orders over HTTP and verifies users through the resilient user
//! client, which degrades to a placeholder user when the user service is down.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use order_service::{create_router, AppState, InMemoryOrderRepository, OrderService, ResilientUserClient};
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

    info!("Starting order service...");

    let http_port: u16 = env::var("HTTP_PORT")
        .unwrap_or_else(|_| "8082".into())
        .parse()?;
    let metrics_port: u16 = env::var("METRICS_PORT")
        .unwrap_or_else(|_| "9092".into())
        .parse()?;
    let user_service_url =
        env::var("USER_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8081".into());
    let user_service_timeout = Duration::from_millis(
        env::var("USER_SERVICE_TIMEOUT_MS")
            .unwrap_or_else(|_| "3000".into())
            .parse()?,
    );
    let service_name = env::var("APP_NAME").unwrap_or_else(|_| "order-service".into());
    let version = env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".into());

    info!("Configuration:");
    info!("  HTTP_PORT: {}", http_port);
    info!("  METRICS_PORT: {}", metrics_port);
    info!("  USER_SERVICE_URL: {}", user_service_url);
    info!("  USER_SERVICE_TIMEOUT: {:?}", user_service_timeout);
    info!("  APP_NAME: {}", service_name);

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics_port))
        .install()?;
    info!("Prometheus metrics server started on port {}", metrics_port);

    let users = ResilientUserClient::http(user_service_url, user_service_timeout);
    let orders = OrderService::new(Arc::new(InMemoryOrderRepository::new()), users);

    let state = Arc::new(AppState {
        orders,
        service_name,
        version,
    });
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Order service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Order service stopped");
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
