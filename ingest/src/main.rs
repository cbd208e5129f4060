use clap::{Command, Arg};
use std::process;


#[tokio::main]
async fn main() {
    let matches = Command::new("Call Log Ingest")
        .version("1.0")
        .about("Validates and uploads exported call-log CSVs")
        .subcommand(
            Command::new("ingest")
                .about("Upload a directory of CSV exports to the audit bucket")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                )
                .arg(
                    Arg::new("dir")
                        .short('d')
                        .long("dir")
                        .value_name("DIR")
                        .help("Directory containing exported CSV files"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("ingest", ingest_matches)) => {
            let config_path = ingest_matches.get_one::<String>("config")
                .map(|s| s.as_str())
                .unwrap_or("config/callaudit.toml");
            let export_dir = ingest_matches.get_one::<String>("dir")
                .map(|s| s.as_str())
                .unwrap_or("exports");
            println!("Starting call log ingest with config: {}", config_path);

            if let Err(e) = ingest::run_ingest_pipeline(config_path, export_dir).await {
                eprintln!("Ingest pipeline error: {}", e);
                process::exit(1);
            }
        },

        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}
