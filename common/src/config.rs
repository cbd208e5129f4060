use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub s3: S3Settings,
    #[serde(default = "default_audit_config")]
    pub audit: AuditConfig,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3Settings {
    #[serde(default = "default_s3_endpoint")]
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    #[serde(default = "default_call_log_bucket")]
    pub call_log_bucket: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// How many agent datasets to build concurrently during warm-up.
    #[serde(default = "default_warm_concurrency")]
    pub warm_concurrency: usize,
    /// Optional cap on rows read per agent log; unset reads everything.
    #[serde(default)]
    pub row_limit: Option<usize>,
}

fn default_audit_config() -> AuditConfig {
    AuditConfig {
        warm_concurrency: default_warm_concurrency(),
        row_limit: None,
    }
}

fn default_warm_concurrency() -> usize {
    4
}

fn default_s3_endpoint() -> String {
    "http://localhost:9000".to_string()
}

fn default_s3_region() -> String {
    "us-east-1".to_string()
}

fn default_call_log_bucket() -> String {
    "call-logs".to_string()
}

fn default_api_port() -> u16 {
    3000
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        // Build the configuration
        let config = builder.build()?;

        // Try to deserialize the entire configuration
        let settings: Settings = config.try_deserialize()?;

        debug!(
            bucket = %settings.s3.call_log_bucket,
            endpoint = %settings.s3.endpoint,
            "Loaded call audit configuration"
        );

        Ok(settings)
    }
}
