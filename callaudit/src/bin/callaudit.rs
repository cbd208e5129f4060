use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use callaudit::services::AuditService;
use common::config::Settings;


#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Initialize configuration
    let config = Settings::new("config/callaudit.toml")?;

    // Initialize audit service
    let service = Arc::new(AuditService::new(&config).await?);

    // Preload every agent's dataset before serving
    let report = service.warm_cache().await?;
    println!(
        "Dataset cache ready: {} agents loaded, {} failed",
        report.loaded,
        report.failed.len()
    );

    // Create API router
    let api_router = callaudit::api::routes(Arc::clone(&service));

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], config.api_port));
    let listener = TcpListener::bind(addr).await?;
    println!("API server listening on {}", addr);
    axum::serve(listener, api_router).await?;

    Ok(())
}
