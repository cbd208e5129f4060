
use clap::{Command, Arg};
use std::process;


#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("Call Audit Manager")
        .version("1.0")
        .about("Audits call-center follow-up performance")
        .subcommand(
            Command::new("serve")
                .about("Run the call audit API server")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            let config_path = serve_matches.get_one::<String>("config")
                .map(|s| s.as_str())
                .unwrap_or("config/callaudit.toml");
            println!("Starting call audit server with config: {}", config_path);

            if let Err(e) = callaudit::run_audit_server(config_path).await {
                eprintln!("Call audit server error: {}", e);
                process::exit(1);
            }
        }
        _ => {
            println!("No subcommand specified. Use --help for usage information.");
            process::exit(1);
        }
    }
}
