use serde::{Deserialize, Serialize};

use crate::models::CallCategory;

// Request models
#[derive(Deserialize)]
pub struct RangeQueryParams {
    pub start_date: String,
    pub end_date: String,
    pub category: Option<CallCategory>,
}

// Response models
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
