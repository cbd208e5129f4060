pub mod s3;

pub use s3::{ObjectStorage, S3Storage};

use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use common::Result;
use common::config::Settings;
use std::sync::Arc;

#[derive(Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub call_log_bucket: String,
}

impl S3Config {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            endpoint: settings.s3.endpoint.clone(),
            region: settings.s3.region.clone(),
            access_key: settings.s3.access_key.clone(),
            secret_key: settings.s3.secret_key.clone(),
            call_log_bucket: settings.s3.call_log_bucket.clone(),
        }
    }
}

#[derive(Clone)]
pub struct S3Manager {
    pub config: S3Config,
    client_cache: Arc<dashmap::DashMap<String, Arc<S3Client>>>,
}

impl S3Manager {
    pub fn new(config: S3Config) -> Self {
        Self {
            config,
            client_cache: Arc::new(dashmap::DashMap::new()),
        }
    }

    pub async fn get_client(&self, bucket: &str) -> Result<Arc<S3Client>> {
        if let Some(client) = self.client_cache.get(bucket) {
            return Ok(client.clone());
        }

        let credentials = Credentials::new(
            &self.config.access_key,
            &self.config.secret_key,
            None,
            None,
            "static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&self.config.endpoint)
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Arc::new(aws_sdk_s3::Client::from_conf(s3_config));
        self.client_cache.insert(bucket.to_string(), client.clone());
        Ok(client)
    }

    /// Verifies that a bucket exists and is accessible
    pub async fn verify_bucket_exists(&self, bucket: &str) -> Result<()> {
        let client = self.get_client(bucket).await?;

        match client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => Err(common::Error::Storage(format!(
                "Cannot access bucket '{}': {}",
                bucket, e
            ))),
        }
    }
}
