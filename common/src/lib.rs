use arrow::error::ArrowError;
use aws_sdk_s3::primitives::ByteStreamError;
use aws_smithy_runtime_api::client::result::CreateUnhandledError;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;
use thiserror::Error;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(std::string::FromUtf8Error),

    #[error("S3 error: {0}")]
    S3(#[from] aws_sdk_s3::Error),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Maximum retries exceeded")]
    MaxRetriesExceeded,

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("ByteStream error: {0}")]
    ByteStream(#[from] ByteStreamError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("CSV decode error: {0}")]
    Decode(String),

    #[error("Record parse error: {0}")]
    RecordParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

// Implement From for various SdkError types
impl<E: std::fmt::Debug + CreateUnhandledError> From<SdkError<E, Response>> for Error {
    fn from(err: SdkError<E, Response>) -> Self {
        Error::AwsSdk(format!("{:?}", err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Utf8(err)
    }
}
