use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_service::clients::{GrpcAccountClient, GrpcCatalogClient};
use order_service::metrics::{self, Metrics};
use order_service::pb::order::order_service_server::OrderServiceServer;
use order_service::repository::PgOrderRepository;
use order_service::{AppConfig, OrderOrchestrator, OrderService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter, e.g. RUST_LOG=debug
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_service=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order service");

    let config = AppConfig::from_env()?;

    // === 1. Postgres ===
    tracing::info!("Connecting to Postgres...");
    let repository = PgOrderRepository::connect(&config.database_url, config.db_max_connections).await?;
    repository.migrate().await?;
    tracing::info!("✅ Database ready");

    // === 2. Collaborators ===
    let accounts = Arc::new(GrpcAccountClient::new(&config.account_service_url, config.upstream_timeout)?);
    let catalog = Arc::new(GrpcCatalogClient::new(&config.catalog_service_url, config.upstream_timeout)?);

    // === 3. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let result = actix_web::rt::System::new()
            .block_on(metrics::start_metrics_server(metrics_registry, metrics_port));
        if let Err(e) = result {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 4. gRPC ===
    let service = OrderService::new(Arc::new(repository.clone()));
    let orchestrator = OrderOrchestrator::new(service, accounts, catalog, metrics);

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<OrderServiceServer<OrderOrchestrator>>()
        .await;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.grpc_port));
    tracing::info!("📡 Serving order.OrderService on {}", addr);

    tonic::transport::Server::builder()
        .add_service(health_service)
        .add_service(orchestrator.into_server())
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    health_reporter
        .set_not_serving::<OrderServiceServer<OrderOrchestrator>>()
        .await;
    repository.close().await;

    tracing::info!("👋 Order service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received");
}
