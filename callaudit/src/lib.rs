pub mod api;
pub mod engine;
pub mod models;
pub mod phone;
pub mod services;
pub mod source;
pub mod storage;


use std::sync::Arc;
use common::config::Settings;
use common::Result;
use services::AuditService;
use tokio::net::TcpListener;
use std::net::SocketAddr;

/// Runs the complete audit service: configuration, storage, dataset
/// warm-up, then the dashboard API.
pub async fn run_audit_server(config_path: &str) -> Result<()> {
    // Load configuration
    let config = Settings::new(config_path)?;

    // Initialize audit service
    let service = Arc::new(AuditService::new(&config).await?);

    // Preload every agent's dataset so first dashboard loads are warm
    let report = service.warm_cache().await?;
    println!(
        "Dataset cache ready: {} agents loaded, {} failed",
        report.loaded,
        report.failed.len()
    );

    // Create API router
    let api_router = api::routes(Arc::clone(&service));

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], config.api_port));
    let listener = TcpListener::bind(addr).await?;
    println!("Call audit API server listening on {}", addr);
    axum::serve(listener, api_router).await?;

    Ok(())
}
