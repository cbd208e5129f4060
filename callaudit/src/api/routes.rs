use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::models::{ApiResponse, RangeQueryParams};
use crate::models::AggregateCounts;
use crate::services::audit::ClassifiedCall;
use crate::services::{AppError, AuditService, DateRange};

pub async fn list_agents(
    State(service): State<Arc<AuditService>>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let agents = service.list_agents().await.map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(agents)))
}

pub async fn agent_calls(
    Path(agent): Path<String>,
    Query(params): Query<RangeQueryParams>,
    State(service): State<Arc<AuditService>>,
) -> Result<Json<ApiResponse<Vec<ClassifiedCall>>>, AppError> {
    let range = DateRange::parse(&params.start_date, &params.end_date).map_err(AppError::from)?;

    let calls = service
        .classified_calls(&agent, &range, params.category)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(calls)))
}

pub async fn agent_summary(
    Path(agent): Path<String>,
    Query(params): Query<RangeQueryParams>,
    State(service): State<Arc<AuditService>>,
) -> Result<Json<ApiResponse<AggregateCounts>>, AppError> {
    let range = DateRange::parse(&params.start_date, &params.end_date).map_err(AppError::from)?;

    let counts = service
        .summary(&agent, &range)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(counts)))
}

// Define all API routes
pub fn routes(service: Arc<AuditService>) -> Router {
    Router::new()
        .route("/api/agents", get(list_agents))
        .route("/api/agents/{agent}/calls", get(agent_calls))
        .route("/api/agents/{agent}/summary", get(agent_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
