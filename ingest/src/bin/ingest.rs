use std::process;
use ingest::run_ingest_pipeline;

#[tokio::main]
async fn main() {
    // Get config path and export directory from command line args or use defaults
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/callaudit.toml".to_string());
    let export_dir = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "exports".to_string());

    println!("Starting call log ingest with config: {}", config_path);

    if let Err(e) = run_ingest_pipeline(&config_path, &export_dir).await {
        eprintln!("Ingest pipeline error: {}", e);
        process::exit(1);
    }
}
