pub mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::config::Settings;
use common::{Error, Result};

use callaudit::source::decode_call_log;
use callaudit::storage::{ObjectStorage, S3Config, S3Manager, S3Storage};
use utils::retry::retry_with_backoff;

/// Uploads every CSV export in a directory to the call-log bucket as
/// `<stem>.csv`. Files that fail validation or upload are reported and
/// skipped; the run continues.
pub async fn run_ingest_pipeline(config_path: &str, export_dir: &str) -> Result<()> {
    let config = Settings::new(config_path)?;
    let s3_config = S3Config::from_settings(&config);
    let s3_manager = Arc::new(S3Manager::new(s3_config.clone()));
    s3_manager
        .verify_bucket_exists(&s3_config.call_log_bucket)
        .await?;

    let storage = S3Storage::new(Arc::clone(&s3_manager), &s3_config.call_log_bucket).await?;

    let mut paths: Vec<PathBuf> = Vec::new();
    let mut dir = tokio::fs::read_dir(export_dir).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("csv") {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        println!("No CSV exports found in {}", export_dir);
        return Ok(());
    }

    let mut uploaded = 0u32;
    let mut failed = 0u32;

    for path in &paths {
        match upload_export(&storage, path).await {
            Ok(key) => {
                uploaded += 1;
                println!("Uploaded {} as {}", path.display(), key);
            }
            Err(e) => {
                failed += 1;
                eprintln!("Failed to upload {}: {}", path.display(), e);
            }
        }
    }

    println!("Ingest finished. Uploaded: {}, Failed: {}", uploaded, failed);
    Ok(())
}

async fn upload_export(storage: &S3Storage, path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            Error::InvalidInput(format!("export file {} has no usable name", path.display()))
        })?;

    let bytes = tokio::fs::read(path).await?;

    // Decode before uploading: the dashboard side should never receive a
    // log it cannot read at all. Rows that fail to parse individually are
    // allowed through; they surface as error-tagged results downstream.
    let entries = decode_call_log(&bytes)?;
    let bad_rows = entries
        .iter()
        .filter(|entry| entry.record.is_err())
        .count();
    if bad_rows > 0 {
        println!(
            "{}: {} of {} rows will classify as errors",
            path.display(),
            bad_rows,
            entries.len()
        );
    }

    let key = format!("{}.csv", stem);
    retry_with_backoff(3, 500, || storage.put_object(&key, &bytes)).await?;
    Ok(key)
}
