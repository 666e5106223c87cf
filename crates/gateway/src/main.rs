//! Gateway service entry point.
//!
//! Single entry point for the user, order and notification services.

use anyhow::Result;
use gateway::{create_router, AppState, GatewayRouter, RouterConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
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

    info!("Starting Gateway service");

    let http_port: u16 = env::var("HTTP_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let metrics_port: u16 = env::var("METRICS_PORT")
        .unwrap_or_else(|_| "9090".into())
        .parse()?;
    let upstream_timeout = Duration::from_millis(
        env::var("UPSTREAM_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".into())
            .parse()?,
    );
    let service_name = env::var("APP_NAME").unwrap_or_else(|_| "gateway".into());
    let version = env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".into());

    let mut router_config = RouterConfig {
        upstream_timeout,
        ..RouterConfig::default()
    };
    for service in &mut router_config.services {
        let var = format!("{}_SERVICE_URLS", service_env_prefix(&service.pool));
        if let Ok(urls) = env::var(&var) {
            service.upstreams = urls.split(',').map(|u| u.trim().to_string()).collect();
        }
    }

    info!("Configuration:");
    info!("  HTTP_PORT: {}", http_port);
    info!("  METRICS_PORT: {}", metrics_port);
    info!("  UPSTREAM_TIMEOUT: {:?}", upstream_timeout);
    for service in &router_config.services {
        info!("  {}: {}", service.pool, service.upstreams.join(","));
    }

    // Start Prometheus metrics server
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics_port))
        .install()?;
    info!("Prometheus metrics server started on port {}", metrics_port);

    let router = GatewayRouter::new(router_config)?;
    let state = Arc::new(AppState {
        router,
        service_name,
        version,
    });
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// `order-service` → `ORDER`
fn service_env_prefix(pool: &str) -> String {
    pool.strip_suffix("-service")
        .unwrap_or(pool)
        .replace('-', "_")
        .to_uppercase()
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
